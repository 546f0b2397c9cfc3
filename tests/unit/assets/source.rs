use super::*;

#[test]
fn file_names_are_zero_padded() {
    assert_eq!(frame_file_name("ezgif-frame", 1, "jpg"), "ezgif-frame-001.jpg");
    assert_eq!(frame_file_name("ezgif-frame", 42, "jpg"), "ezgif-frame-042.jpg");
    assert_eq!(frame_file_name("ezgif-frame", 240, "png"), "ezgif-frame-240.png");
}

#[test]
fn dir_source_resolves_paths_and_reports_missing_files() {
    let dir = PathBuf::from("target").join("unit_dir_source");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("seq-003.jpg"), b"abc").unwrap();

    let src = DirFrameSource::new(&dir, "seq", "jpg");
    assert_eq!(src.path_for(3), dir.join("seq-003.jpg"));
    assert_eq!(src.fetch(3).unwrap(), b"abc");

    let err = src.fetch(4).unwrap_err();
    assert!(err.to_string().contains("seq-004.jpg"));
}

#[test]
fn memory_source_serves_inserted_frames_only() {
    let src = MemoryFrameSource::new().with_frame(1, vec![1, 2, 3]);
    assert_eq!(src.fetch(1).unwrap(), vec![1, 2, 3]);
    assert!(matches!(src.fetch(2), Err(ReelError::Load(_))));
}
