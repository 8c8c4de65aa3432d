//! Unit tests for br-memory.

#[cfg(test)]
mod store {
    use br_core::{AgentId, Tick};

    use crate::catalog::{ATTACK_TARGET, HOME, RAM_COOLDOWN_TICKS};
    use crate::{MemoryLayout, MemoryModule, MemoryStatus, MemoryStore};

    fn store() -> MemoryStore {
        MemoryLayout::new()
            .with(ATTACK_TARGET)
            .with(HOME)
            .with(RAM_COOLDOWN_TICKS)
            .instantiate()
    }

    #[test]
    fn set_is_visible_immediately() {
        let mut s = store();
        assert_eq!(s.get(ATTACK_TARGET), None);
        s.set(ATTACK_TARGET, AgentId(4));
        assert_eq!(s.get(ATTACK_TARGET), Some(&AgentId(4)));
        assert!(s.has_value(ATTACK_TARGET));
    }

    #[test]
    fn erase_forces_absent() {
        let mut s = store();
        s.set(RAM_COOLDOWN_TICKS, 3);
        s.erase(RAM_COOLDOWN_TICKS);
        assert!(s.has(RAM_COOLDOWN_TICKS.id(), MemoryStatus::Absent));
    }

    #[test]
    fn expiry_is_exclusive_of_the_end_tick() {
        let mut s = store();
        s.advance(Tick(10));
        s.set_with_expiry(ATTACK_TARGET, AgentId(1), 5);
        assert_eq!(s.expiry_of(ATTACK_TARGET), Some(Tick(15)));

        s.advance(Tick(14));
        assert!(s.has_value(ATTACK_TARGET));

        assert_eq!(s.advance(Tick(15)), 1);
        assert_eq!(s.get(ATTACK_TARGET), None);
    }

    #[test]
    fn set_replaces_expiry() {
        let mut s = store();
        s.set_with_expiry(HOME, br_core::BlockPos::new(1, 64, 1), 2);
        s.set(HOME, br_core::BlockPos::new(2, 64, 2));
        s.advance(Tick(100));
        assert_eq!(s.get(HOME), Some(&br_core::BlockPos::new(2, 64, 2)));
        assert_eq!(s.expiry_of(HOME), None);
    }

    #[test]
    fn registered_matches_any_state_of_declared_modules() {
        let mut s = store();
        assert!(s.has(HOME.id(), MemoryStatus::Registered));
        s.set(HOME, br_core::BlockPos::ORIGIN);
        assert!(s.has(HOME.id(), MemoryStatus::Registered));
        assert!(s.has(HOME.id(), MemoryStatus::Present));
        assert!(!s.has(HOME.id(), MemoryStatus::Absent));
    }

    #[test]
    fn undeclared_modules_never_match() {
        let s = store();
        let other: MemoryModule<u8> = MemoryModule::new(999, "other");
        for status in [MemoryStatus::Present, MemoryStatus::Absent, MemoryStatus::Registered] {
            assert!(!s.has(other.id(), status));
        }
    }

    #[test]
    #[should_panic(expected = "not declared")]
    fn reading_undeclared_module_panics() {
        let s = store();
        let other: MemoryModule<u8> = MemoryModule::new(999, "other");
        let _ = s.get(other);
    }

    #[test]
    #[should_panic(expected = "not declared")]
    fn writing_undeclared_module_panics() {
        let mut s = MemoryStore::empty();
        s.set(HOME, br_core::BlockPos::ORIGIN);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut s = store();
        s.set(RAM_COOLDOWN_TICKS, 5);
        if let Some(v) = s.get_mut(RAM_COOLDOWN_TICKS) {
            *v -= 1;
        }
        assert_eq!(s.get(RAM_COOLDOWN_TICKS), Some(&4));
    }

    #[test]
    fn register_twice_keeps_value() {
        let mut s = store();
        s.set(RAM_COOLDOWN_TICKS, 7);
        s.register(RAM_COOLDOWN_TICKS.key());
        assert_eq!(s.get(RAM_COOLDOWN_TICKS), Some(&7));
    }

    #[test]
    fn present_names_are_sorted() {
        let mut s = store();
        s.set(RAM_COOLDOWN_TICKS, 1);
        s.set(ATTACK_TARGET, AgentId(0));
        assert_eq!(s.present_names(), vec!["attack_target", "ram_cooldown_ticks"]);
    }

    #[test]
    fn take_moves_value_out() {
        let mut s = store();
        s.set(ATTACK_TARGET, AgentId(9));
        assert_eq!(s.take(ATTACK_TARGET), Some(AgentId(9)));
        assert!(!s.has_value(ATTACK_TARGET));
    }
}

#[cfg(test)]
mod layout {
    use crate::catalog::{HOME, WALK_TARGET};
    use crate::MemoryLayout;

    #[test]
    fn duplicates_are_ignored() {
        let layout = MemoryLayout::new().with(HOME).with(HOME).with(WALK_TARGET);
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn instantiate_declares_every_key() {
        let layout = MemoryLayout::new().with(HOME).with(WALK_TARGET);
        let store = layout.instantiate();
        assert_eq!(store.registered_keys(), vec![WALK_TARGET.key(), HOME.key()]);
    }

    #[test]
    fn erased_keys_declare_like_typed_modules() {
        let layout = MemoryLayout::new().with_key(HOME.key()).with(HOME);
        assert_eq!(layout.len(), 1);
        assert!(layout.instantiate().is_registered(HOME.id()));
    }
}

#[cfg(test)]
mod bank {
    use br_core::{AgentId, Tick};

    use crate::catalog::ATTACK_TARGET;
    use crate::{MemoryBank, MemoryLayout};

    #[test]
    fn install_and_cross_agent_write() {
        let mut bank = MemoryBank::new(2);
        let layout = MemoryLayout::new().with(ATTACK_TARGET);
        bank.install(AgentId(0), layout.instantiate());
        bank.install(AgentId(1), layout.instantiate());

        bank.store_mut(AgentId(1)).set(ATTACK_TARGET, AgentId(0));
        assert_eq!(bank.store(AgentId(1)).get(ATTACK_TARGET), Some(&AgentId(0)));
        assert_eq!(bank.store(AgentId(0)).get(ATTACK_TARGET), None);
    }

    #[test]
    fn install_grows_bank() {
        let mut bank = MemoryBank::new(0);
        bank.install(AgentId(3), MemoryLayout::new().instantiate());
        assert_eq!(bank.len(), 4);
    }

    #[test]
    fn advance_all_sweeps_every_store() {
        let mut bank = MemoryBank::new(2);
        let layout = MemoryLayout::new().with(ATTACK_TARGET);
        for id in [AgentId(0), AgentId(1)] {
            bank.install(id, layout.instantiate());
            bank.store_mut(id).set_with_expiry(ATTACK_TARGET, AgentId(9), 1);
        }
        assert_eq!(bank.advance_all(Tick(1)), 2);
    }

    #[test]
    fn out_of_range_is_none() {
        let bank = MemoryBank::new(1);
        assert!(bank.get(AgentId(5)).is_none());
    }
}

#[cfg(test)]
mod catalog {
    use std::collections::HashSet;

    use crate::catalog::ALL;

    #[test]
    fn ids_and_names_are_unique() {
        let ids: HashSet<_> = ALL.iter().map(|k| k.id).collect();
        let names: HashSet<_> = ALL.iter().map(|k| k.name).collect();
        assert_eq!(ids.len(), ALL.len());
        assert_eq!(names.len(), ALL.len());
    }
}
