use std::{
    io::Cursor,
    sync::{Mutex, atomic::AtomicUsize},
};

use super::*;
use crate::assets::source::MemoryFrameSource;

fn png_bytes(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([shade, shade, shade, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn memory_source(total: u32, skip: &[u32]) -> Arc<dyn FrameSource> {
    let mut src = MemoryFrameSource::new();
    for p in 1..=total {
        if !skip.contains(&p) {
            src.insert(p, png_bytes(p as u8));
        }
    }
    Arc::new(src)
}

fn fast_opts(concurrency: usize) -> LoadOpts {
    LoadOpts {
        concurrency,
        timeout: Some(Duration::from_secs(5)),
        retries: 0,
    }
}

#[test]
fn progress_is_monotonic_and_ends_at_exactly_100_despite_failures() {
    for concurrency in [1, 3] {
        let loader =
            FrameLoader::new(memory_source(10, &[2, 7]), 10, fast_opts(concurrency)).unwrap();
        let mut reports = Vec::new();
        let store = loader
            .load(&CancelToken::new(), |p| reports.push(p))
            .unwrap();

        assert_eq!(reports.len(), 10);
        assert!(reports.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*reports.last().unwrap(), 100.0);

        assert_eq!(store.len(), 10);
        assert_eq!(store.missing(), 2);
        assert!(store.get(1).is_none());
        assert!(store.get(6).is_none());
        assert_eq!(store.get(9).unwrap().position, 10);
    }
}

#[test]
fn sequential_mode_loads_in_order() {
    struct Recording {
        inner: Arc<dyn FrameSource>,
        order: Mutex<Vec<u32>>,
    }

    impl FrameSource for Recording {
        fn fetch(&self, position: u32) -> ReelResult<Vec<u8>> {
            self.order.lock().unwrap().push(position);
            self.inner.fetch(position)
        }
    }

    let src = Arc::new(Recording {
        inner: memory_source(5, &[]),
        order: Mutex::new(Vec::new()),
    });
    let loader = FrameLoader::new(src.clone(), 5, LoadOpts::sequential()).unwrap();
    let store = loader.load(&CancelToken::new(), |_| {}).unwrap();

    assert_eq!(store.resolved(), 5);
    assert_eq!(*src.order.lock().unwrap(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn stalled_attempt_times_out_and_retry_succeeds() {
    struct StallOnce {
        inner: Arc<dyn FrameSource>,
        calls: AtomicUsize,
    }

    impl FrameSource for StallOnce {
        fn fetch(&self, position: u32) -> ReelResult<Vec<u8>> {
            if position == 2 && self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::thread::sleep(Duration::from_millis(800));
            }
            self.inner.fetch(position)
        }
    }

    let src = Arc::new(StallOnce {
        inner: memory_source(3, &[]),
        calls: AtomicUsize::new(0),
    });
    let opts = LoadOpts {
        concurrency: 2,
        timeout: Some(Duration::from_millis(100)),
        retries: 1,
    };
    let loader = FrameLoader::new(src.clone(), 3, opts).unwrap();
    let start = Instant::now();
    let store = loader.load(&CancelToken::new(), |_| {}).unwrap();

    assert!(start.elapsed() < Duration::from_millis(700));
    assert_eq!(store.resolved(), 3);
    assert_eq!(src.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn timeout_without_retry_leaves_slot_empty() {
    struct AlwaysStall;

    impl FrameSource for AlwaysStall {
        fn fetch(&self, _position: u32) -> ReelResult<Vec<u8>> {
            std::thread::sleep(Duration::from_millis(500));
            Err(ReelError::load("too late"))
        }
    }

    let opts = LoadOpts {
        concurrency: 2,
        timeout: Some(Duration::from_millis(30)),
        retries: 0,
    };
    let loader = FrameLoader::new(Arc::new(AlwaysStall), 2, opts).unwrap();
    let mut last = 0.0;
    let store = loader.load(&CancelToken::new(), |p| last = p).unwrap();
    assert_eq!(store.missing(), 2);
    assert_eq!(last, 100.0);
}

#[test]
fn cancellation_abandons_waits_and_publishes_nothing() {
    struct Stall;

    impl FrameSource for Stall {
        fn fetch(&self, _position: u32) -> ReelResult<Vec<u8>> {
            std::thread::sleep(Duration::from_secs(2));
            Err(ReelError::load("never"))
        }
    }

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        trigger.cancel();
    });

    let loader = FrameLoader::new(Arc::new(Stall), 4, LoadOpts::sequential()).unwrap();
    let start = Instant::now();
    let mut reports = 0;
    let err = loader.load(&cancel, |_| reports += 1).unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(reports, 0);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn zero_frames_completes_immediately() {
    let loader = FrameLoader::new(memory_source(0, &[]), 0, LoadOpts::default()).unwrap();
    let mut reports = Vec::new();
    let store = loader.load(&CancelToken::new(), |p| reports.push(p)).unwrap();
    assert!(store.is_empty());
    assert_eq!(reports, vec![100.0]);
}

#[test]
fn invalid_options_are_rejected() {
    let opts = LoadOpts {
        concurrency: 0,
        ..LoadOpts::default()
    };
    assert!(FrameLoader::new(memory_source(1, &[]), 1, opts).is_err());

    let opts = LoadOpts {
        timeout: Some(Duration::ZERO),
        ..LoadOpts::default()
    };
    assert!(FrameLoader::new(memory_source(1, &[]), 1, opts).is_err());
}
