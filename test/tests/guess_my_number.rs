use std::{cell::Cell, rc::Rc};

use concord_shared::{IdSpace, Message, RoleKind, Subscriber, World, REFEREE_ID};
use concord_test::{
    guess_my_number::{protocol, world, GuessNumber, GuessState, PickNumber},
    Harness,
};

const PLAYER: RoleKind = RoleKind("player");

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn send(world: &mut World, sender: u32, message: impl Message) {
    let factory = IdSpace::new(1, 3).factory(sender);
    let mut message: Box<dyn Message> = Box::new(message);
    message.try_set_sender_id(sender).unwrap();
    assert!(message.check(world, &factory));
    message.execute(world);
}

fn picked_world() -> World {
    let mut world = world();
    send(&mut world, REFEREE_ID, PickNumber::exactly(7, 0, 10));
    world
}

#[test]
fn right_guess_wins() {
    let mut world = picked_world();
    send(&mut world, 2, GuessNumber::new(2, 7));

    let state = world.root::<GuessState>();
    assert_eq!(state.winner(), Some(2));
    assert!(state.is_game_over());
    assert!(world.has_game_ended());
}

#[test]
fn low_guess_raises_the_lower_bound() {
    let mut world = picked_world();
    send(&mut world, 2, GuessNumber::new(2, 3));

    let state = world.root::<GuessState>();
    assert_eq!(state.lower_bound(), 3);
    assert_eq!(state.upper_bound(), 10);
    assert_eq!(state.winner(), None);
}

#[test]
fn guesses_are_checked() {
    let world = picked_world();
    let factory = IdSpace::new(1, 3).factory(2);

    // someone else's name
    let mut message: Box<dyn Message> = Box::new(GuessNumber::new(1, 5));
    message.try_set_sender_id(2).unwrap();
    assert!(!message.check(&world, &factory));

    // already ruled out
    let mut message: Box<dyn Message> = Box::new(GuessNumber::new(2, 10));
    message.try_set_sender_id(2).unwrap();
    assert!(!message.check(&world, &factory));

    // only the referee picks
    let mut message: Box<dyn Message> = Box::new(PickNumber::exactly(4, 0, 10));
    message.try_set_sender_id(2).unwrap();
    assert!(!message.check(&world, &factory));
}

#[test]
fn referee_picks_through_its_report() {
    init();
    let mut harness = Harness::new(2, protocol, world, PLAYER);
    harness.join_and_start();
    harness.tick_n(3);

    let numbers: Vec<_> = harness
        .worlds()
        .map(|world| world.root::<GuessState>().number())
        .collect();
    let number = numbers[0].expect("the referee should have picked");
    assert!((1..10).contains(&number));
    assert!(numbers.iter().all(|n| *n == Some(number)));
}

#[test]
fn a_full_game_converges() {
    init();
    let mut harness = Harness::new(2, protocol, world, PLAYER);
    harness.join_and_start();
    harness
        .server
        .send_message(Box::new(PickNumber::exactly(7, 0, 10)))
        .unwrap();
    harness.tick();

    let first = harness.client(0).identity().unwrap();
    let second = harness.client(1).identity().unwrap();
    assert!(harness
        .client(0)
        .send_message(Box::new(GuessNumber::new(first, 2)))
        .unwrap());
    harness.tick_n(2);
    assert!(harness
        .client(1)
        .send_message(Box::new(GuessNumber::new(second, 9)))
        .unwrap());
    harness.tick_n(2);
    assert!(harness
        .client(0)
        .send_message(Box::new(GuessNumber::new(first, 7)))
        .unwrap());
    harness.tick_n(2);

    for world in harness.worlds() {
        let state = world.root::<GuessState>();
        assert_eq!(state.lower_bound(), 2);
        assert_eq!(state.upper_bound(), 9);
        assert_eq!(state.winner(), Some(first));
        assert!(world.has_game_ended());
    }

    // nobody ticks a finished game
    let ticks: Vec<u32> = harness
        .worlds()
        .map(|world| world.root::<GuessState>().ticks())
        .collect();
    harness.tick_n(3);
    let after: Vec<u32> = harness
        .worlds()
        .map(|world| world.root::<GuessState>().ticks())
        .collect();
    assert_eq!(ticks, after);
}

#[test]
fn stale_guesses_are_soft_sync_errors() {
    init();
    let mut harness = Harness::new(2, protocol, world, PLAYER);

    let mut counters = Vec::new();
    for client in harness.clients.iter_mut() {
        let soft = Rc::new(Cell::new(0));
        let inner = soft.clone();
        client
            .forum_mut()
            .subscribe_to_soft_sync_error::<GuessNumber, _>(move |_: &World, _: &GuessNumber| {
                inner.set(inner.get() + 1)
            });
        counters.push(soft);
    }

    harness.join_and_start();
    harness
        .server
        .send_message(Box::new(PickNumber::exactly(7, 0, 10)))
        .unwrap();
    harness.tick();

    // both guesses are fine as far as each client knows
    let first = harness.client(0).identity().unwrap();
    let second = harness.client(1).identity().unwrap();
    assert!(harness
        .client(0)
        .send_message(Box::new(GuessNumber::new(first, 5)))
        .unwrap());
    assert!(harness
        .client(1)
        .send_message(Box::new(GuessNumber::new(second, 3)))
        .unwrap());
    harness.tick_n(3);

    // the second guess reached the server after the first had ruled it out
    assert_eq!(counters[0].get(), 1);
    assert_eq!(counters[1].get(), 1);
    for world in harness.worlds() {
        let state = world.root::<GuessState>();
        assert_eq!(state.lower_bound(), 5);
        assert_eq!(state.upper_bound(), 10);
    }
}
