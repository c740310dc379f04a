use std::cmp::Ordering;
use std::path::Path;

use tempfile::TempDir;

use crate::disparity::common::{DisparityError, FramePair, Image};
use crate::disparity::frames::{
    DirectoryFrameSource, FrameSource, InMemoryFrameSource, LEFT_DIR, RIGHT_DIR, natural_cmp, natural_sort,
};

fn write_gray(path: &Path, width: u32, height: u32, fill: impl Fn(u32, u32) -> u8) {
    let img = image::GrayImage::from_fn(width, height, |x, y| image::Luma([fill(x, y)]));
    img.save(path).unwrap();
}

fn stereo_dir(names: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join(LEFT_DIR)).unwrap();
    std::fs::create_dir(dir.path().join(RIGHT_DIR)).unwrap();
    for name in names {
        write_gray(&dir.path().join(LEFT_DIR).join(name), 8, 6, |x, _| (x * 10) as u8);
        write_gray(&dir.path().join(RIGHT_DIR).join(name), 8, 6, |x, _| (x * 10 + 5) as u8);
    }
    dir
}

#[test]
fn test_natural_sort_numeric_runs() {
    let mut names = vec!["img2.png", "img10.png", "img1.png"];
    natural_sort(&mut names);
    assert_eq!(names, ["img1.png", "img2.png", "img10.png"]);
}

#[test]
fn test_natural_cmp_case_insensitive() {
    assert_eq!(natural_cmp("a.png", "B.png"), Ordering::Less);
    assert_eq!(natural_cmp("Img3.png", "img3.png"), Ordering::Equal);
    assert_eq!(natural_cmp("IMG4", "img12"), Ordering::Less);
}

#[test]
fn test_natural_cmp_prefix_and_letters() {
    assert_eq!(natural_cmp("frame1.png", "img10.png"), Ordering::Less);
    assert_eq!(natural_cmp("img", "img1"), Ordering::Less);
    assert_eq!(natural_cmp("", "a"), Ordering::Less);
    assert_eq!(natural_cmp("", ""), Ordering::Equal);
}

#[test]
fn test_natural_cmp_digit_sorts_before_letter() {
    assert_eq!(natural_cmp("1abc", "abc"), Ordering::Less);
    assert_eq!(natural_cmp("a1", "ab"), Ordering::Less);
    assert_eq!(natural_cmp("ab", "a1"), Ordering::Greater);
}

#[test]
fn test_natural_cmp_leading_zeros_and_long_runs() {
    assert_eq!(natural_cmp("img007.png", "img7.png"), Ordering::Equal);
    assert_eq!(natural_cmp("img008.png", "img7.png"), Ordering::Greater);
    assert_eq!(
        natural_cmp("f99999999999999999999999.png", "f100000000000000000000000.png"),
        Ordering::Less
    );
}

#[test]
fn test_natural_cmp_continues_after_equal_runs() {
    assert_eq!(natural_cmp("s1_f2", "s1_f10"), Ordering::Less);
    assert_eq!(natural_cmp("s2_f1", "s10_f1"), Ordering::Less);
}

#[test]
fn test_natural_sort_owned_strings() {
    let mut names: Vec<String> = ["x20", "x3", "X1", "x100"].iter().map(|s| s.to_string()).collect();
    natural_sort(&mut names);
    assert_eq!(names, ["X1", "x3", "x20", "x100"]);
}

#[test]
fn test_in_memory_source() {
    let mut source = InMemoryFrameSource::default();
    assert!(source.is_empty());

    source.push(FramePair::new("a", Image::filled(4, 4, 1), Image::filled(4, 4, 2)));
    source.push(FramePair::new("b", Image::filled(4, 4, 3), Image::filled(4, 4, 4)));

    assert_eq!(source.len(), 2);
    assert_eq!(source.frame_name(1), "b");
    let pair = source.read_pair(0).unwrap();
    assert_eq!(pair.left.get(0, 0), 1);
    assert_eq!(pair.right.get(3, 3), 2);

    assert!(matches!(source.read_pair(2), Err(DisparityError::FrameReadError(_))));
}

#[test]
fn test_in_memory_source_rejects_mismatched_pair() {
    let source = InMemoryFrameSource::new(vec![FramePair::new(
        "bad",
        Image::filled(4, 4, 0),
        Image::filled(4, 5, 0),
    )]);
    assert!(matches!(
        source.read_pair(0),
        Err(DisparityError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_directory_source_natural_order() {
    let dir = stereo_dir(&["img10.png", "img2.png", "img1.png"]);
    let source = DirectoryFrameSource::open(dir.path()).unwrap();

    assert_eq!(source.names(), ["img1.png", "img2.png", "img10.png"]);
    assert_eq!(source.frame_name(2), "img10.png");
}

#[test]
fn test_directory_source_reads_grayscale_pairs() {
    let dir = stereo_dir(&["frame0.png"]);
    let source = DirectoryFrameSource::open(dir.path()).unwrap();

    let pair = source.read_pair(0).unwrap();
    assert_eq!(pair.name, "frame0.png");
    assert_eq!(pair.left.dimensions(), (8, 6));
    assert_eq!(pair.left.get(2, 3), 30);
    assert_eq!(pair.right.get(2, 3), 35);
}

#[test]
fn test_directory_source_skips_subdirectories() {
    let dir = stereo_dir(&["img1.png"]);
    std::fs::create_dir(dir.path().join(LEFT_DIR).join("nested")).unwrap();

    let source = DirectoryFrameSource::open(dir.path()).unwrap();
    assert_eq!(source.len(), 1);
}

#[test]
fn test_directory_source_missing_directories() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        DirectoryFrameSource::open(dir.path()),
        Err(DisparityError::FrameReadError(_))
    ));

    std::fs::create_dir(dir.path().join(RIGHT_DIR)).unwrap();
    assert!(matches!(
        DirectoryFrameSource::open(dir.path()),
        Err(DisparityError::FrameReadError(_))
    ));
}

#[test]
fn test_directory_source_empty() {
    let dir = stereo_dir(&[]);
    assert!(matches!(
        DirectoryFrameSource::open(dir.path()),
        Err(DisparityError::EmptyFrameSource(_))
    ));
}

#[test]
fn test_directory_source_dimension_mismatch() {
    let dir = stereo_dir(&["img1.png"]);
    write_gray(&dir.path().join(RIGHT_DIR).join("img1.png"), 9, 6, |_, _| 0);

    let source = DirectoryFrameSource::open(dir.path()).unwrap();
    assert!(matches!(
        source.read_pair(0),
        Err(DisparityError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_directory_source_missing_right_view() {
    let dir = stereo_dir(&["img1.png"]);
    std::fs::remove_file(dir.path().join(RIGHT_DIR).join("img1.png")).unwrap();

    let source = DirectoryFrameSource::open(dir.path()).unwrap();
    assert!(matches!(source.read_pair(0), Err(DisparityError::FrameReadError(_))));
}

#[test]
fn test_directory_source_undecodable_file() {
    let dir = stereo_dir(&[]);
    std::fs::write(dir.path().join(LEFT_DIR).join("notes.txt"), b"not an image").unwrap();
    std::fs::write(dir.path().join(RIGHT_DIR).join("notes.txt"), b"not an image").unwrap();

    let source = DirectoryFrameSource::open(dir.path()).unwrap();
    assert!(matches!(source.read_pair(0), Err(DisparityError::FrameReadError(_))));
}

#[cfg(unix)]
#[test]
fn test_directory_source_follows_symlinked_frames() {
    let dir = stereo_dir(&["img1.png"]);
    let store = TempDir::new().unwrap();
    for side in [LEFT_DIR, RIGHT_DIR] {
        let target = store.path().join(format!("{side}.png"));
        write_gray(&target, 8, 6, |x, _| x as u8);
        std::os::unix::fs::symlink(&target, dir.path().join(side).join("img2.png")).unwrap();
    }

    let source = DirectoryFrameSource::open(dir.path()).unwrap();
    assert_eq!(source.names(), ["img1.png", "img2.png"]);
    assert_eq!(source.read_pair(1).unwrap().left.get(0, 5), 5);
}

#[test]
fn test_directory_source_reads_pgm_frames() {
    let dir = stereo_dir(&[]);
    for side in [LEFT_DIR, RIGHT_DIR] {
        write_gray(&dir.path().join(side).join("im0.pgm"), 10, 4, |x, y| (x + y * 10) as u8);
    }

    let source = DirectoryFrameSource::open(dir.path()).unwrap();
    let pair = source.read_pair(0).unwrap();
    assert_eq!(pair.left.dimensions(), (10, 4));
    assert_eq!(pair.right.get(3, 7), 37);
}
