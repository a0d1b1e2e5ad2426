//! Tests for thread spawner utilities

use rwsem_stress::core::Spawn;
use rwsem_stress::runtime::ThreadSpawner;

#[test]
fn test_thread_spawner_spawn() {
    let spawner = ThreadSpawner::new();

    let handle = spawner
        .spawn("down-2", || {
            let name = std::thread::current().name().map(str::to_owned);
            (name, 123)
        })
        .expect("spawn worker");

    let (name, value) = handle.join().expect("join worker");
    assert_eq!(name.as_deref(), Some("down-2"));
    assert_eq!(value, 123);
}
