use particlize_sim::particle::{Color, ParticleShape, ParticleStorage};

fn storage_with(n: usize, capacity: usize) -> ParticleStorage {
    let mut storage = ParticleStorage::new(capacity);
    for i in 0..n {
        storage.create_particle(i as f32, 0.0, Color::ONE, ParticleShape::Circle, 4.0);
    }
    storage
}

// ==================================
// 1. Cycle de vie d'une particule
// ==================================

#[test]
fn test_created_particles_are_pending() {
    let storage = storage_with(3, 8);
    assert_eq!(storage.len(), 3);
    assert_eq!(storage.pending_count(), 3);
    assert_eq!(storage.active_count(), 0);
    assert!((0..3).all(|i| storage.is_pending(i) && !storage.is_active(i)));
}

#[test]
fn test_activation_moves_pending_to_active() {
    let mut storage = storage_with(3, 8);
    storage.activate_particle(1);
    storage.activate_particle(1);

    assert_eq!(storage.active_count(), 1);
    assert_eq!(storage.pending_count(), 2);
    assert_eq!(storage.active_indices().collect::<Vec<_>>(), vec![1]);
    assert_eq!(storage.pending_indices().collect::<Vec<_>>(), vec![0, 2]);
}

#[test]
fn test_deactivation_is_idempotent() {
    let mut once = storage_with(2, 4);
    once.activate_particle(0);
    once.deactivate_particle(0);

    let mut twice = storage_with(2, 4);
    twice.activate_particle(0);
    twice.deactivate_particle(0);
    twice.deactivate_particle(0);

    for storage in [&once, &twice] {
        assert!(!storage.is_active(0));
        assert!(!storage.is_pending(0));
        assert_eq!(storage.active_count(), 0);
        assert_eq!(storage.pending_count(), 1);
    }
}

#[test]
fn test_retired_particle_is_never_reactivated() {
    let mut storage = storage_with(1, 1);
    storage.activate_particle(0);
    storage.deactivate_particle(0);
    storage.activate_particle(0);
    assert!(!storage.is_active(0));
    assert_eq!(storage.active_count(), 0);
}

#[test]
fn test_pending_particle_can_be_retired() {
    let mut storage = storage_with(2, 2);
    storage.deactivate_particle(1);
    assert_eq!(storage.pending_count(), 1);
    assert!(!storage.is_pending(1));
}

// ==================================
// 2. Capacité et indices invalides
// ==================================

#[test]
fn test_create_returns_none_when_full() {
    let mut storage = storage_with(2, 2);
    assert!(storage.is_full());
    assert_eq!(
        storage.create_particle(0.0, 0.0, Color::ONE, ParticleShape::Square, 1.0),
        None
    );
    assert_eq!(storage.len(), 2);
}

#[test]
fn test_out_of_range_indices_are_noops() {
    let mut storage = storage_with(2, 4);
    storage.activate_particle(3);
    storage.deactivate_particle(10);
    assert_eq!(storage.pending_count(), 2);
    assert!(!storage.is_active(3));
}

#[test]
fn test_reset_keeps_capacity() {
    let mut storage = storage_with(4, 4);
    storage.activate_particle(0);
    storage.reset();
    assert!(storage.is_empty());
    assert_eq!(storage.capacity(), 4);
    assert_eq!(storage.active_count() + storage.pending_count(), 0);
    assert!(storage
        .create_particle(5.0, 6.0, Color::ONE, ParticleShape::Custom, 2.0)
        .is_some());
    assert_eq!(storage.original[0].x, 5.0);
}

// ==================================
// 3. Découpage en vues disjointes
// ==================================

#[test]
fn test_chunks_cover_all_particles_once() {
    let mut storage = storage_with(10, 10);
    for i in 0..10 {
        storage.activate_particle(i);
    }
    let chunks = storage.chunks_mut(4);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![4, 4, 2]);
    assert_eq!(chunks[2].global_index(1), 9);
}

#[test]
fn test_chunk_deactivation_updates_counts() {
    let mut storage = storage_with(6, 6);
    for i in 0..6 {
        storage.activate_particle(i);
    }
    let retired: usize = {
        let mut chunks = storage.chunks_mut(3);
        chunks[1].deactivate(0);
        chunks[1].deactivate(0);
        chunks[0].position[2].x = 99.0;
        chunks.iter().map(|c| c.retired()).sum()
    };
    assert_eq!(retired, 1);
    storage.note_retired(retired);

    assert_eq!(storage.active_count(), 5);
    assert!(!storage.is_active(3));
    assert_eq!(storage.position[2].x, 99.0);
}
