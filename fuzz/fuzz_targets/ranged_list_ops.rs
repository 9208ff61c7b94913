#![no_main]
use libfuzzer_sys::fuzz_target;
use rangedict::{PlainList, RangeIterable, RangedList, Readable, Writable};

fuzz_target!(|data: (u8, Vec<(u8, u16, u16, u8)>)| {
    let (size_raw, ops) = data;
    let size = size_raw as usize % 64 + 1;

    let mut ranged = RangedList::new(size, 0u8);
    let mut plain = PlainList::new(size, 0u8);

    for (kind, a, b, value) in ops {
        let value = value % 4;
        let a = a as usize % (size + 1);
        let b = b as usize % (size + 1);
        match kind % 3 {
            0 => {
                let id = a % size;
                ranged.set_value_by_id(id, value).unwrap();
                plain.set_value_by_id(id, value).unwrap();
            }
            1 => {
                ranged.set_value_by_slice(a, b, value).unwrap();
                plain.set_value_by_slice(a, b, value).unwrap();
            }
            _ => {
                let ids = [a % size, b % size, (a + b) % size];
                ranged.set_value_by_ids(&ids, value).unwrap();
                plain.set_value_by_ids(&ids, value).unwrap();
            }
        }
        assert!(ranged.check_invariants(), "invariants broken: {ranged}");
    }

    assert_eq!(ranged.get_ranges(), plain.get_ranges());
    for id in 0..size {
        assert_eq!(ranged.get_value_by_id(id), plain.get_value_by_id(id));
    }
});
