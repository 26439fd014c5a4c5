use std::{cell::RefCell, rc::Rc};

use concord_client::ClientError;
use concord_server::{RemoteActors, ServerError};
use concord_shared::{
    constants::FORUM_TARGET,
    pipe::{LocalPipe, Tag},
    Forum, ForumConfig, IdSpace, Identity, Message, Subscriber, World, REFEREE_ID,
};
use concord_test::{
    test_protocol::{protocol, world, Note, GUI},
    Harness, ScriptedPipe, PENDING_IDENTITY,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn clients_get_identities_in_accept_order() {
    init();
    let mut harness = Harness::new(2, protocol, world, GUI);
    assert!(!harness.client(0).is_joined());

    harness.join_and_start();
    assert_eq!(harness.client(0).identity(), Some(1));
    assert_eq!(harness.client(1).identity(), Some(2));

    let mut identities: Vec<Identity> = harness.server.forum().role().identities().collect();
    identities.sort_unstable();
    assert_eq!(identities, vec![1, 2]);

    // every participant hands out ids from its own block
    let first = harness.client(0).actor().id_factory().unwrap().clone();
    let second = harness.client(1).actor().id_factory().unwrap().clone();
    assert!(first.contains(2));
    assert!(second.contains(3));
    assert!(!first.contains(3));
    assert!(harness.server.referee().actor().id_factory().unwrap().contains(1));
}

#[test]
fn no_messages_before_joining() {
    init();
    let mut harness = Harness::new(1, protocol, world, GUI);
    assert_eq!(
        harness.client(0).send_message(Box::new(Note::new("early"))),
        Err(ClientError::NotJoined)
    );
}

#[test]
fn a_full_server_turns_clients_away() {
    let mut harness = Harness::new(1, protocol, world, GUI);
    let (extra, _) = LocalPipe::pair(REFEREE_ID, PENDING_IDENTITY);
    assert_eq!(
        harness.server.accept(Box::new(extra)),
        Err(ServerError::Full { max_clients: 1 })
    );
}

#[test]
fn joining_closes_once_started() {
    let mut harness = Harness::new(1, protocol, world, GUI);
    harness.join_and_start();
    assert!(harness.server.is_started());

    let (late, _) = LocalPipe::pair(REFEREE_ID, PENDING_IDENTITY);
    assert_eq!(
        harness.server.accept(Box::new(late)),
        Err(ServerError::AlreadyStarted)
    );
}

fn note_from(sender: Identity, ticker: u32) -> (Tag, concord_shared::Flavor, Vec<u8>) {
    let mut note: Box<dyn Message> = Box::new(Note::new("hello"));
    note.try_set_sender_id(sender).unwrap();
    let (flavor, payload) = protocol().pack_message(note.as_ref()).unwrap();
    let tag = Tag {
        target: FORUM_TARGET,
        origin: sender,
        ticker: ticker.into(),
    };
    (tag, flavor, payload)
}

#[test]
fn spoofed_senders_are_dropped() {
    init();
    let mut world: World = world();
    let mut forum = Forum::new(ForumConfig::default(), protocol(), RemoteActors::new());

    let (pipe, script) = ScriptedPipe::new(REFEREE_ID);
    let index = forum.connect(Box::new(pipe));
    forum
        .role_mut()
        .add_client(index, IdSpace::new(1, 3).factory(1));
    let (stranger, stranger_script) = ScriptedPipe::new(REFEREE_ID);
    forum.connect(Box::new(stranger));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let inner = seen.clone();
    forum.subscribe::<Note, _>(move |_, note| inner.borrow_mut().push(note.sender_id()));
    forum.lock();

    let (tag, flavor, payload) = note_from(2, 1);
    script.push(tag, flavor, &payload);
    forum.update(&mut world);
    assert!(seen.borrow().is_empty());

    let (tag, flavor, payload) = note_from(1, 1);
    script.push(tag, flavor, &payload);
    forum.update(&mut world);
    assert_eq!(*seen.borrow(), vec![Some(1)]);

    // relayed to the other pipe with its original tag
    let relayed = stranger_script.take_delivered();
    assert_eq!(relayed.len(), 1);
    assert_eq!(relayed[0].tag.origin, 1);

    // nobody joined on the second pipe
    let (tag, flavor, payload) = note_from(1, 2);
    stranger_script.push(tag, flavor, &payload);
    forum.update(&mut world);
    assert_eq!(seen.borrow().len(), 1);
    assert!(script.take_delivered().is_empty());
}
