use desk_physics::{DeskWorld, ObjectKind, PhysicsError, Tunables, Vec2};

#[test]
fn removed_slots_are_reused_with_a_new_generation() {
    let mut world = DeskWorld::default();
    let first = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    let kept = world.spawn_on_desk(ObjectKind::Pen, 1.0, 0.0);
    assert_eq!(world.len(), 2);

    let removed = world.remove(first).unwrap();
    assert_eq!(removed.kind, ObjectKind::Mug);
    assert!(!world.contains(first));
    assert_eq!(world.len(), 1);

    let second = world.spawn_on_desk(ObjectKind::Lamp, 0.0, 0.0);
    assert_eq!(second.index(), first.index());
    assert_ne!(second.generation(), first.generation());
    assert!(world.get(first).is_none());
    assert_eq!(world.get(second).unwrap().kind, ObjectKind::Lamp);
    assert_eq!(world.remove(first), Err(PhysicsError::UnknownObject(first)));
    assert_eq!(world.ids(), vec![second, kept]);
}

#[test]
fn motion_is_created_on_first_use() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    assert!(world.motion(mug).is_none());

    world.motion_mut(mug).unwrap().velocity = Vec2::new(0.1, 0.0);
    let motion = world.motion(mug).unwrap();
    assert_eq!(motion.velocity, Vec2::new(0.1, 0.0));
    assert_eq!(motion.tilt, Vec2::ZERO);
    assert!(!motion.is_at_rest());
}

#[test]
fn pair_mut_borrows_two_distinct_bodies() {
    let mut world = DeskWorld::default();
    let a = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    let b = world.spawn_on_desk(ObjectKind::Pen, 1.0, 0.0);

    {
        let (body_b, body_a) = world.pair_mut(b, a).unwrap();
        body_a.motion.velocity.x = 1.0;
        body_b.motion.velocity.x = 2.0;
    }
    assert_eq!(world.motion(a).unwrap().velocity.x, 1.0);
    assert_eq!(world.motion(b).unwrap().velocity.x, 2.0);
    assert!(world.pair_mut(a, a).is_none());
}

#[test]
fn spawned_objects_rest_on_their_surface() {
    let mut world = DeskWorld::default();
    let globe = world.spawn_on_desk(ObjectKind::Globe, 0.0, 0.0);
    let books = world.spawn_on_desk(ObjectKind::Books, 1.0, 0.0);
    let mug = world.spawn_on(ObjectKind::Mug, books).unwrap();

    let globe = world.get(globe).unwrap();
    assert!((globe.bottom_y() - 0.75).abs() < 1e-6);
    assert!((globe.position.y - 0.95).abs() < 1e-6);
    let books_top = world.get(books).unwrap().top_surface_y();
    assert!((world.get(mug).unwrap().bottom_y() - books_top).abs() < 1e-6);
}

#[test]
fn spawn_on_missing_base_fails() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    world.remove(books).unwrap();
    assert_eq!(
        world.spawn_on(ObjectKind::Pen, books),
        Err(PhysicsError::UnknownObject(books))
    );
}

#[test]
fn drop_tween_converges_on_target() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    world.get_mut(mug).unwrap().position.y = 1.5;
    world.get_mut(mug).unwrap().target_y = Some(0.81);

    assert!(world.animate_drops(0.3));
    let y = world.get(mug).unwrap().position.y;
    assert!((y - (1.5 - 0.69 * 0.3)).abs() < 1e-5);

    let mut frames = 1;
    while world.animate_drops(0.3) {
        frames += 1;
        assert!(frames < 100);
    }
    let obj = world.get(mug).unwrap();
    assert_eq!(obj.position.y, 0.81);
    assert_eq!(obj.target_y, None);
}

#[test]
fn object_ids_display_index_and_generation() {
    let mut world = DeskWorld::default();
    let id = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    assert_eq!(id.to_string(), "#0.0");
    world.remove(id).unwrap();
    let id = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    assert_eq!(id.to_string(), "#0.1");
}

#[test]
fn kinds_use_kebab_case_tags() {
    let kind: ObjectKind = serde_json::from_str("\"photo-frame\"").unwrap();
    assert_eq!(kind, ObjectKind::PhotoFrame);
    let kind: ObjectKind = serde_json::from_str("\"lava-lamp\"").unwrap();
    assert_eq!(kind, ObjectKind::Unknown);
    assert_eq!(
        serde_json::to_string(&ObjectKind::CassettePlayer).unwrap(),
        "\"cassette-player\""
    );
}

#[test]
fn partial_tunables_fill_in_defaults() {
    let tunables: Tunables = serde_json::from_str(r#"{ "friction": 0.8, "lift_height": 0.2 }"#).unwrap();
    assert_eq!(tunables.friction, 0.8);
    assert_eq!(tunables.lift_height, 0.2);
    assert_eq!(tunables.desk_surface_y, Tunables::default().desk_surface_y);
    assert!(tunables.validate().is_ok());
}

#[test]
fn world_uses_its_own_tunables() {
    let tunables = Tunables {
        desk_surface_y: 1.0,
        ..Tunables::default()
    };
    let mut world = DeskWorld::new(tunables);
    let paper = world.spawn_on_desk(ObjectKind::Paper, 0.0, 0.0);
    assert_eq!(world.get(paper).unwrap().position.y, 1.0);
}
