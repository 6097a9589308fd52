use super::*;
use crate::config::*;
use tempfile::{NamedTempFile, TempDir};

#[tokio::test]
async fn test() {
    // given
    let db_file = NamedTempFile::new().unwrap();
    let pool = establish_connection(db_file.path().to_str().unwrap())
        .await
        .unwrap();
    let mut connection = pool.acquire().await.unwrap();
    let progress_bar = ProgressBar::hidden();

    let library_root = TempDir::new().unwrap();
    let tmp_directory = TempDir::new().unwrap();
    set_directory(&mut connection, LIBRARY_ROOT, &library_root.path())
        .await
        .unwrap();
    set_directory(&mut connection, TMP_DIRECTORY, &tmp_directory.path())
        .await
        .unwrap();

    let system_id = create_system(&mut connection, "Nintendo 64", "n64")
        .await
        .unwrap();
    let game_id = create_game(&mut connection, "Missing", system_id)
        .await
        .unwrap();
    let rom_set_id = create_rom_set(&mut connection, game_id, "USA", "", "")
        .await
        .unwrap();
    create_rom(
        &mut connection,
        rom_set_id,
        &RomInput {
            file_path: "n64/Missing (USA).z64",
            file_name: "Missing (USA).z64",
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let job_id = create_download_job(&mut connection, &[game_id], "n64", None)
        .await
        .unwrap();

    // when
    let result = run_download_job(&pool, &progress_bar, job_id).await;
    let unknown = run_download_job(&pool, &progress_bar, job_id + 1).await;

    // then
    assert!(matches!(result, Err(Error::AllGamesMissing(_))));
    assert!(matches!(unknown, Err(Error::NotFound(_))));
    let download_job = find_download_job_by_id(&mut connection, job_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(download_job.status(), Some(JobStatus::Failed));
    assert!(download_job.completed_at.is_some());
    assert_eq!(download_job.expires_at, None);
    let errors: Vec<String> = serde_json::from_str(&download_job.errors).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("All game files are missing: Missing: "));
    assert_eq!(std::fs::read_dir(tmp_directory.path()).unwrap().count(), 0);
}
