use std::time::Duration;

use desk_physics::drag::{
    damping_factor, drag_stacking_y, move_stacked_objects, movement_transfer, pull_resistance,
    push_multipliers, stacked_resistance,
};
use desk_physics::{
    DeskObject, DeskWorld, DropOutcome, InteractionContext, InteractionMode, ObjectKind,
    PhysicsError, Tunables, Vec2, Vec3,
};

const EPS: f32 = 1e-4;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn slow_drag_carries_pen_on_books() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    let pen = world.spawn_on(ObjectKind::Pen, books).unwrap();

    let moved = move_stacked_objects(&mut world, books, Vec2::new(0.5, 0.0), 0.0);
    assert_eq!(moved, 1);

    // min(0.75, 0.8) * 0.8 friction constant, damped by the pen's weight.
    let expected = 0.75 * 0.8 * 0.5 * (1.0 - 0.3 * 0.05 / 0.9);
    let pen_obj = world.get(pen).unwrap();
    assert!((pen_obj.position.x - expected).abs() < EPS);
    assert!(pen_obj.position.z.abs() < EPS);
    assert!((pen_obj.bottom_y() - world.get(books).unwrap().top_surface_y()).abs() < EPS);

    let kick = world.motion(pen).unwrap().velocity.x;
    assert!((kick - expected * 0.3).abs() < EPS);
}

#[test]
fn carried_motion_attenuates_up_the_stack() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    let books_top = world.get(books).unwrap().top_surface_y();
    // Tall enough that the top books only rest on the player.
    let player = world.insert(
        DeskObject::new(ObjectKind::CassettePlayer, Vec3::new(0.0, books_top, 0.0)).with_scale(2.0),
    );
    let top = world.spawn_on(ObjectKind::Books, player).unwrap();

    move_stacked_objects(&mut world, books, Vec2::new(0.2, 0.0), 0.0);
    let player_x = world.get(player).unwrap().position.x;
    let top_x = world.get(top).unwrap().position.x;
    assert!(player_x > 0.0 && player_x < 0.2);
    assert!(top_x > 0.0 && top_x < player_x);
}

#[test]
fn transfer_never_grows_with_speed() {
    let t = Tunables::default();
    for (bottom, top) in [
        (ObjectKind::Books, ObjectKind::Pen),
        (ObjectKind::Laptop, ObjectKind::Paper),
        (ObjectKind::Paper, ObjectKind::Laptop),
        (ObjectKind::Notebook, ObjectKind::Books),
    ] {
        let (bottom, top) = (bottom.physics(), top.physics());
        let mut previous = f32::INFINITY;
        for step in 0..=50 {
            let speed = step as f32 * 0.1;
            let transfer = movement_transfer(&bottom, &top, speed, &t);
            assert!(transfer <= previous + 1e-6, "speed {speed}");
            assert!(transfer > 0.0);
            previous = transfer;
        }
    }
}

#[test]
fn damping_stays_within_bounds() {
    assert!((damping_factor(0.0) - 1.0).abs() < EPS);
    assert!((damping_factor(0.5) - 0.7).abs() < EPS);
    assert!((damping_factor(5.0) - 0.46).abs() < EPS);
    assert!((damping_factor(-1.0) - 1.0).abs() < EPS);
}

#[test]
fn push_scales_with_weight_ratio_and_speed() {
    let t = Tunables::default();
    let (heavy, speed) = push_multipliers(1.5, 0.05, 5.0, &t);
    assert!((heavy - 3.0).abs() < EPS);
    assert!((speed - 1.0).abs() < EPS);

    let (light, _) = push_multipliers(0.05, 1.5, 5.0, &t);
    assert!((light - 0.05).abs() < EPS);

    let (still, speed) = push_multipliers(1.5, 0.05, 0.04, &t);
    assert_eq!(still, 0.0);
    assert_eq!(speed, 0.0);

    let (ramp, speed) = push_multipliers(1.0, 1.0, 0.1, &t);
    assert!((speed - 0.5).abs() < EPS);
    assert!((ramp - 0.75).abs() < EPS);
}

#[test]
fn lone_object_is_lifted() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    let mut ctx = InteractionContext::new();

    let mode = ctx.begin_drag(&mut world, mug, Vec2::ZERO, ms(0)).unwrap();
    assert_eq!(mode, InteractionMode::Dragging);
    assert_eq!(ctx.dragged(), Some(mug));
    let obj = world.get(mug).unwrap();
    assert!(obj.flags.lifted);
    assert!((obj.position.y - (0.75 + 0.15 + 0.06)).abs() < EPS);
}

#[test]
fn object_with_something_on_top_is_pulled_out() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    world.spawn_on(ObjectKind::Pen, books).unwrap();
    let mut ctx = InteractionContext::new();

    let mode = ctx.begin_drag(&mut world, books, Vec2::ZERO, ms(0)).unwrap();
    assert_eq!(mode, InteractionMode::PullingOut);
    let obj = world.get(books).unwrap();
    assert!(obj.flags.pulling_out && !obj.flags.lifted);
    assert!((obj.position.y - 0.75).abs() < EPS);
}

#[test]
fn drag_requires_an_active_grab() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    let pen = world.spawn_on_desk(ObjectKind::Pen, 1.0, 0.0);
    let mut ctx = InteractionContext::new();

    assert_eq!(
        ctx.drag_to(&mut world, Vec2::ONE, ms(10)),
        Err(PhysicsError::NotDragging)
    );
    assert_eq!(ctx.release(&mut world), Err(PhysicsError::NotDragging));

    ctx.begin_drag(&mut world, mug, Vec2::ZERO, ms(0)).unwrap();
    assert_eq!(
        ctx.begin_drag(&mut world, pen, Vec2::ZERO, ms(0)),
        Err(PhysicsError::AlreadyDragging(mug))
    );
}

#[test]
fn grabbing_a_removed_object_fails() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    world.remove(mug).unwrap();
    let mut ctx = InteractionContext::new();

    assert_eq!(
        ctx.begin_drag(&mut world, mug, Vec2::ZERO, ms(0)),
        Err(PhysicsError::UnknownObject(mug))
    );
    assert!(!ctx.is_dragging());
}

#[test]
fn pull_out_leaves_the_rider_behind() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    let pen = world.spawn_on(ObjectKind::Pen, books).unwrap();
    let mut ctx = InteractionContext::new();

    ctx.begin_drag(&mut world, books, Vec2::ZERO, ms(0)).unwrap();
    let frame = ctx.drag_to(&mut world, Vec2::new(1.0, 0.0), ms(1000)).unwrap();

    let stacked = 0.05 / 0.9 * 0.4;
    assert!((frame.resistance - stacked).abs() < EPS);
    let books_x = 1.0 - stacked * 0.6;
    assert!((frame.position.x - books_x).abs() < EPS);

    let pen_x = world.get(pen).unwrap().position.x;
    assert!(pen_x > 0.0 && pen_x < books_x);

    let outcome = ctx.release(&mut world).unwrap();
    assert!(matches!(outcome, DropOutcome::Resting { on: None, .. }));
    let pen_obj = world.get(pen).unwrap();
    assert!((pen_obj.target_y.unwrap() - 0.75).abs() < EPS);
}

#[test]
fn combined_resistance_is_capped() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    world.spawn_on(ObjectKind::Lamp, books).unwrap();
    world.spawn_on(ObjectKind::Laptop, books).unwrap();

    let pull = pull_resistance(&world, books, Vec2::new(0.2, 0.0));
    assert!((0.0..=1.0).contains(&pull));
    assert!((stacked_resistance(&world, books) - 0.8).abs() < EPS);

    let mut ctx = InteractionContext::new();
    ctx.begin_drag(&mut world, books, Vec2::ZERO, ms(0)).unwrap();
    let frame = ctx.drag_to(&mut world, Vec2::new(0.2, 0.0), ms(1000)).unwrap();
    assert!((frame.resistance - 0.9).abs() < EPS);
    assert!((frame.position.x - 0.2 * 0.46).abs() < EPS);
}

#[test]
fn pull_resistance_fades_with_distance() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    world.spawn_on(ObjectKind::Laptop, books).unwrap();

    let near = pull_resistance(&world, books, Vec2::new(0.1, 0.0));
    let far = pull_resistance(&world, books, Vec2::new(0.5, 0.0));
    let gone = pull_resistance(&world, books, Vec2::new(1.0, 0.0));
    assert!(near > far);
    assert!(far > gone);
    assert_eq!(gone, 0.0);
}

#[test]
fn fast_drag_pushes_what_it_hits() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    let clock = world.spawn_on_desk(ObjectKind::Clock, 0.3, 0.0);
    let mut ctx = InteractionContext::new();

    ctx.begin_drag(&mut world, books, Vec2::ZERO, ms(0)).unwrap();
    let frame = ctx.drag_to(&mut world, Vec2::new(0.2, 0.0), ms(100)).unwrap();
    assert_eq!(frame.contacts, 1);

    // 0.02 push force * min(0.8 / 0.6 * 1.5, 3)
    let velocity = world.motion(clock).unwrap().velocity;
    assert!((velocity.x - 0.04).abs() < EPS);
    assert!(velocity.y.abs() < EPS);
    let overlap = 0.7 * (0.2 + 0.12) - 0.1;
    assert!((world.get(clock).unwrap().position.x - (0.3 + overlap * 0.5)).abs() < EPS);
    assert!((world.get(books).unwrap().position.x - 0.2).abs() < EPS);
}

#[test]
fn slow_drag_separates_without_pushing() {
    let mut world = DeskWorld::default();
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    let clock = world.spawn_on_desk(ObjectKind::Clock, 0.3, 0.0);
    let mut ctx = InteractionContext::new();

    ctx.begin_drag(&mut world, books, Vec2::ZERO, ms(0)).unwrap();
    ctx.drag_to(&mut world, Vec2::new(0.2, 0.0), ms(10_000)).unwrap();

    assert_eq!(world.motion(clock).unwrap().velocity, Vec2::ZERO);
    assert!(world.get(clock).unwrap().position.x > 0.3);
}

#[test]
fn lifted_object_passes_over_low_neighbours() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    let paper = world.spawn_on_desk(ObjectKind::Paper, 0.4, 0.0);
    let mut ctx = InteractionContext::new();

    ctx.begin_drag(&mut world, mug, Vec2::ZERO, ms(0)).unwrap();
    let frame = ctx.drag_to(&mut world, Vec2::new(0.4, 0.0), ms(100)).unwrap();
    assert_eq!(frame.contacts, 0);
    assert!((world.get(paper).unwrap().position.x - 0.4).abs() < EPS);
    assert!(world.motion(paper).is_none());
}

#[test]
fn laptop_screen_blocks_a_lifted_mug() {
    let mut world = DeskWorld::default();
    let laptop = world.spawn_on_desk(ObjectKind::Laptop, 0.0, 0.0);
    let mug = world.spawn_on_desk(ObjectKind::Mug, 0.0, -0.5);
    let mut ctx = InteractionContext::new();

    ctx.begin_drag(&mut world, mug, Vec2::new(0.0, -0.5), ms(0)).unwrap();
    let frame = ctx.drag_to(&mut world, Vec2::new(0.0, -0.22), ms(100)).unwrap();

    assert_eq!(frame.contacts, 1);
    assert!(world.get(mug).unwrap().position.z < -0.22);
    assert_ne!(world.motion(laptop).unwrap().velocity, Vec2::ZERO);
}

#[test]
fn dragged_object_stays_on_the_desk() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 4.5, 0.0);
    let mut ctx = InteractionContext::new();

    ctx.begin_drag(&mut world, mug, Vec2::new(4.5, 0.0), ms(0)).unwrap();
    let frame = ctx.drag_to(&mut world, Vec2::new(10.0, -9.0), ms(100)).unwrap();
    assert!((frame.position.x - (5.0 - 0.08)).abs() < EPS);
    assert!((frame.position.y + (2.5 - 0.08)).abs() < EPS);
}

#[test]
fn layer_scroll_raises_the_hover_height() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    let mut ctx = InteractionContext::new();

    ctx.scroll_layer(0.3);
    assert_eq!(ctx.layer_offset, 0.0);

    ctx.begin_drag(&mut world, mug, Vec2::ZERO, ms(0)).unwrap();
    ctx.scroll_layer(0.3);
    ctx.drag_to(&mut world, Vec2::ZERO, ms(16)).unwrap();
    assert!((world.get(mug).unwrap().position.y - (0.75 + 0.21 + 0.3)).abs() < EPS);

    ctx.scroll_layer(-1.0);
    assert_eq!(ctx.layer_offset, 0.0);
}

#[test]
fn hover_height_respects_ceilings() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 0.0, 0.0);
    assert!((drag_stacking_y(&world, mug, Vec2::ZERO, 10.0) - (0.75 + 2.5)).abs() < EPS);

    // A stray stack far above the desk is not trusted as a surface.
    world.insert(DeskObject::new(ObjectKind::Books, Vec3::new(0.0, 0.75 + 3.5, 0.0)));
    assert!((drag_stacking_y(&world, mug, Vec2::ZERO, 0.0) - (0.75 + 0.21)).abs() < EPS);
}

#[test]
fn hover_height_follows_the_surface_below() {
    let mut world = DeskWorld::default();
    let mug = world.spawn_on_desk(ObjectKind::Mug, 1.0, 0.0);
    let books = world.spawn_on_desk(ObjectKind::Books, 0.0, 0.0);
    let top = world.get(books).unwrap().top_surface_y();

    assert!((drag_stacking_y(&world, mug, Vec2::ZERO, 0.0) - (top + 0.21)).abs() < EPS);
    assert!((drag_stacking_y(&world, mug, Vec2::new(1.0, 0.0), 0.0) - (0.75 + 0.21)).abs() < EPS);
}
