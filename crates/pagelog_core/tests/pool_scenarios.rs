//! Integration tests for the page pool, end to end through the public API.

use pagelog_core::{
    BudgetAllocator, ClearPolicy, OverflowPolicy, PageKind, PagePool, PoolConfig, PoolError,
};

#[test]
fn test_demo_session() {
    let mut pool = PagePool::create(6, 1024).unwrap();
    pool.clear_all();

    assert_eq!(pool.append(0, "Hello, World!").unwrap(), 13);
    assert_eq!(pool.append(1, "Hello, World!").unwrap(), 13);
    assert_eq!(pool.append_line(1, "This is a test line.").unwrap(), 21);
    assert_eq!(pool.append(1, "This is a test.").unwrap(), 15);

    assert_eq!(pool.text(0).unwrap(), "Hello, World!");
    assert_eq!(
        pool.text(1).unwrap(),
        "Hello, World!This is a test line.\nThis is a test."
    );
    assert_eq!(pool.remaining(1).unwrap(), 1024 - 13 - 21 - 15);

    // Terminating zero right after the content.
    let raw = pool.raw_buffer(1).unwrap();
    assert_eq!(raw[13 + 21 + 15], 0);

    pool.verify_layout().unwrap();
}

#[test]
fn test_minimum_page() {
    let mut pool = PagePool::create(1, 2).unwrap();
    assert_eq!(pool.page_capacity(), 2);

    assert_eq!(pool.append(0, "abcdef").unwrap(), 2);
    assert_eq!(pool.content(0).unwrap(), b"ab");
    assert_eq!(pool.append(0, "c").unwrap(), 0);

    pool.clear(0).unwrap();
    assert_eq!(pool.append_line(0, "abcdef").unwrap(), 2);
    assert_eq!(pool.content(0).unwrap(), b"a\n");
    pool.verify_layout().unwrap();
}

#[test]
fn test_invalid_creation_holds_no_memory() {
    let budget = BudgetAllocator::new(1 << 20);

    let result = PagePool::with_config_in(&PoolConfig::new(0, 100), &budget);
    assert!(matches!(result, Err(PoolError::InvalidParameters { .. })));
    assert_eq!(budget.in_use(), 0);

    let result = PagePool::with_config_in(&PoolConfig::new(5, 0), &budget);
    assert!(matches!(result, Err(PoolError::InvalidParameters { .. })));
    assert_eq!(budget.in_use(), 0);
}

#[test]
fn test_fill_until_full() {
    let mut pool = PagePool::create(2, 100).unwrap();
    let mut total = 0;
    loop {
        let written = pool.append(0, "0123456789abc").unwrap();
        total += written;
        if written == 0 {
            break;
        }
    }
    assert_eq!(total, 100);
    assert_eq!(pool.remaining(0).unwrap(), 0);
    assert_eq!(&pool.content(0).unwrap()[91..], b"012345678");
    assert_eq!(pool.remaining(1).unwrap(), 100);
    pool.verify_layout().unwrap();
}

#[test]
fn test_strict_mode_reports_instead_of_truncating() {
    let config = PoolConfig::new(1, 10).with_overflow(OverflowPolicy::Reject);
    let mut pool = PagePool::with_config(&config).unwrap();

    assert_eq!(
        pool.append(0, "this does not fit"),
        Err(PoolError::CapacityExceeded { requested: 17, available: 10 })
    );
    assert_eq!(pool.remaining(0).unwrap(), 10);

    pool.set_overflow_policy(OverflowPolicy::Truncate);
    assert_eq!(pool.append(0, "this does not fit").unwrap(), 10);
}

#[test]
fn test_clear_resets_any_state() {
    let mut pool = PagePool::create(4, 32).unwrap();
    for index in 0..4 {
        pool.append_line(index, "data").unwrap();
        pool.set_kind(index, PageKind::Error).unwrap();
    }

    pool.clear(2).unwrap();
    for page in pool.pages() {
        if page.index() == 2 {
            assert!(page.is_empty());
            assert_eq!(page.kind(), PageKind::Default);
        } else {
            assert_eq!(page.text(), "data\n");
            assert_eq!(page.kind(), PageKind::Error);
        }
    }
}

#[test]
fn test_clear_policies_differ_only_in_stale_bytes() {
    let sentinel = PoolConfig::new(1, 16);
    let zero_fill = PoolConfig::new(1, 16).with_clear_all(ClearPolicy::ZeroFill);

    let mut a = PagePool::with_config(&sentinel).unwrap();
    let mut b = PagePool::with_config(&zero_fill).unwrap();
    for pool in [&mut a, &mut b] {
        pool.append(0, "abcdefgh").unwrap();
        pool.clear_all();
        assert!(pool.content(0).unwrap().is_empty());
        assert_eq!(pool.remaining(0).unwrap(), 16);
    }

    assert_eq!(&a.raw_buffer(0).unwrap()[..8], b"\0\0cdefgh");
    assert!(b.raw_buffer(0).unwrap().iter().all(|&byte| byte == 0));
}

#[test]
fn test_pool_per_thread() {
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            std::thread::spawn(move || {
                let mut pool = PagePool::create(2, 64).unwrap();
                pool.append_line(0, format!("worker {worker}")).unwrap();
                pool.text(0).unwrap().into_owned()
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("worker {worker}\n"));
    }
}

#[test]
fn test_pool_moves_between_threads() {
    let mut pool = PagePool::create(1, 64).unwrap();
    pool.append(0, "main").unwrap();

    let pool = std::thread::spawn(move || {
        pool.append(0, "+worker").unwrap();
        pool
    })
    .join()
    .unwrap();

    assert_eq!(pool.text(0).unwrap(), "main+worker");
}

#[test]
fn test_config_file_drives_pool() {
    let path = std::env::temp_dir().join(format!("pagelog_test_{}.toml", std::process::id()));
    std::fs::write(&path, "page_count = 3\npage_capacity = 48\nbuffer_alignment = 64\n").unwrap();

    let config = PoolConfig::from_toml_file(&path).unwrap();
    let pool = PagePool::with_config(&config).unwrap();
    assert_eq!(pool.page_count(), 3);
    assert_eq!(pool.buffer_alignment(), 64);
    for record in pool.verify_layout().unwrap().pages {
        assert_eq!(record.buffer_address % 64, 0);
    }

    std::fs::remove_file(&path).ok();
}
