use anyhow::Result;
use oorandom::Rand64;
use std::collections::HashMap;
use std::path::PathBuf;

use EntryDB::config::StoreBuilder;
use EntryDB::{Entry, EntryTree, Section, Store};

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("entrydb-{}-{}-{}", prefix, pid, t))
}

fn bytes(rng: &mut Rand64, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.rand_u64() as u8).collect()
}

#[test]
fn stress_random_put_release_verify() -> Result<()> {
    let path = unique_root("stress-chains");
    let cfg = StoreBuilder::from_default()
        .block_size(128)
        .remove_on_close(true)
        .build();
    let mut s = Store::open_with_config(&path, cfg)?;
    let payload = (s.block_size() - 8) as u64;

    // Модель: offset -> содержимое записи
    let mut model: HashMap<u64, Vec<u8>> = HashMap::new();
    let mut rng = Rand64::new(0x5EED_B10C_C4A1_0001);

    for step in 0..3000 {
        let live: Vec<u64> = model.keys().copied().collect();
        let op = rng.rand_range(0..10);
        if op < 6 || live.is_empty() {
            let len = match rng.rand_range(0..4) {
                0 => 0,
                1 => rng.rand_range(1..payload) as usize,
                2 => payload as usize * rng.rand_range(1..4) as usize,
                _ => rng.rand_range(1..(6 * payload)) as usize,
            };
            let data = bytes(&mut rng, len);
            let free_before = s.free_list().len();
            let front_before = s.front();
            let off = s.put_record(&data)?;
            if free_before > 0 {
                assert_ne!(off, front_before, "step {}: free block must be used first", step);
            }
            assert!(model.insert(off, data).is_none(), "step {}: offset {} handed out twice", step, off);
        } else {
            let off = live[rng.rand_range(0..live.len() as u64) as usize];
            let data = model.remove(&off).unwrap_or_default();
            let blocks = s.release(off)?;
            let expect = std::cmp::max(1, (data.len() as u64 + payload - 1) / payload);
            assert_eq!(blocks, expect, "step {}: chain length for {} bytes", step, data.len());
        }

        if step % 250 == 0 {
            for (off, data) in &model {
                assert_eq!(&s.get_record(*off, data.len())?, data, "step {}: off {}", step, off);
            }
        }
    }

    for (off, data) in &model {
        assert_eq!(&s.get_record(*off, data.len())?, data);
    }

    // все блоки файла: заголовок + живые цепочки + free‑лист
    let live_blocks: u64 = model
        .values()
        .map(|d| std::cmp::max(1, (d.len() as u64 + payload - 1) / payload))
        .sum();
    let st = s.stats();
    assert_eq!(st.total_blocks, 1 + live_blocks + st.free_blocks);
    s.close()?;
    Ok(())
}

#[test]
fn stress_random_skeleton_paging() -> Result<()> {
    let path = unique_root("stress-skel");
    let cfg = StoreBuilder::from_default().remove_on_close(true).build();
    let mut s = Store::open_with_config(&path, cfg)?;
    let mut rng = Rand64::new(0x0DD_F00D);

    let mut root = Entry::new(Section::Namespace, "root");
    for i in 0..200 {
        let mut c = Entry::new(Section::Function, format!("fn{}", i));
        c.program = "x".repeat(rng.rand_range(0..2000) as usize);
        root.add_child(c);
    }
    let mut t = EntryTree::new();
    let top = t.commit_subtree(None, root.clone(), &mut s)?;
    let ids: Vec<_> = t.walk(top).collect();

    for _ in 0..2000 {
        let id = ids[rng.rand_range(0..ids.len() as u64) as usize];
        if rng.rand_range(0..2) == 0 {
            t.load(id, &mut s)?;
            assert!(t.is_resident(id));
        } else {
            t.release(id)?;
            assert!(!t.is_resident(id));
        }
    }

    assert_eq!(t.load_subtree(top, &mut s)?, root);
    s.close()?;
    Ok(())
}
