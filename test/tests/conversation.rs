use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use concord_shared::{
    conversation::{Conversation, Exchange, Inform, Letter, Mailbox, Reply, Request},
    handshake::{JoinGrant, JoinRequest},
    pipe::{LocalPipe, Pipe},
    Flavor, IdSpace,
};

const TALK: u32 = 40;

#[derive(Debug, Serialize, Deserialize)]
struct Ping(u32);

impl Letter for Ping {
    const FLAVOR: Flavor = 20;
}

#[derive(Debug, Serialize, Deserialize)]
struct Pong(u32);

impl Letter for Pong {
    const FLAVOR: Flavor = 21;
}

#[derive(Debug, Serialize, Deserialize)]
struct Bye;

impl Letter for Bye {
    const FLAVOR: Flavor = 22;
}

struct AwaitBye {
    done: bool,
}

impl Exchange for AwaitBye {
    fn update(&mut self, mailbox: &mut Mailbox) {
        self.done = self.done || mailbox.take::<Bye>().is_some();
    }

    fn is_complete(&self) -> bool {
        self.done
    }
}

fn boxed(exchange: impl Exchange + 'static) -> Vec<Box<dyn Exchange>> {
    vec![Box::new(exchange)]
}

fn pong(Ping(n): Ping) -> Pong {
    Pong(n * 10)
}

#[test]
fn successors_chain_across_rounds() {
    let (left, right) = LocalPipe::pair(1, 0);
    let answers = Arc::new(Mutex::new(Vec::new()));

    let first_answers = answers.clone();
    let asker = Request::new(Ping(1), move |Pong(n): Pong| {
        first_answers.lock().unwrap().push(n);
        let second_answers = first_answers.clone();
        boxed(Request::new(Ping(2), move |Pong(n): Pong| {
            second_answers.lock().unwrap().push(n);
            boxed(Inform::new(Bye))
        }))
    });
    let answerer = Reply::new(|ping: Ping| {
        (
            pong(ping),
            boxed(Reply::new(|ping: Ping| {
                (pong(ping), boxed(AwaitBye { done: false }))
            })),
        )
    });

    let mut client = Conversation::new(Box::new(left), TALK, boxed(asker));
    let mut server = Conversation::new(Box::new(right), TALK, boxed(answerer));

    let mut rounds = 0;
    while !(client.is_finished() && server.is_finished()) {
        client.update();
        server.update();
        rounds += 1;
        assert!(rounds < 10, "conversation never finished");
    }

    assert_eq!(*answers.lock().unwrap(), vec![10, 20]);
    assert_eq!(rounds, 3);
}

#[test]
fn handshake_carries_the_id_factory() {
    let (client_end, server_end) = LocalPipe::pair(u32::MAX, 0);
    let granted = Arc::new(Mutex::new(None));

    let space = IdSpace::new(1, 4);
    let server_copy = space.factory(3);
    let grant = server_copy.clone();
    let reply = Reply::new(move |_: JoinRequest| {
        (
            JoinGrant {
                id_factory: grant.clone(),
            },
            Vec::new(),
        )
    });

    let sink = granted.clone();
    let request = Request::new(JoinRequest, move |grant: JoinGrant| {
        *sink.lock().unwrap() = Some(grant.id_factory);
        Vec::new()
    });

    let mut client = Conversation::new(Box::new(client_end), TALK, boxed(request));
    let mut server = Conversation::new(Box::new(server_end), TALK, boxed(reply));
    client.update();
    assert!(server.update());
    assert!(client.update());

    let mut factory = granted.lock().unwrap().take().unwrap();
    assert_eq!(factory.get(), 3);
    assert_eq!(factory, server_copy);
    assert_eq!(factory.next(), 4);
    assert!(server_copy.contains(4));

    let pipe = client.into_pipe();
    assert_eq!(pipe.get_identity(), u32::MAX);
}

#[test]
fn letters_of_other_flavors_do_not_block() {
    let (left, right) = LocalPipe::pair(1, 0);
    let mut sender = Conversation::new(
        Box::new(left),
        TALK,
        vec![
            Box::new(Inform::new(Pong(5))) as Box<dyn Exchange>,
            Box::new(Inform::new(Bye)),
        ],
    );
    let mut receiver = Conversation::new(Box::new(right), TALK, boxed(AwaitBye { done: false }));

    assert!(sender.update());
    assert!(receiver.update());
}
