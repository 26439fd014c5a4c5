use crate::{pipe::Pipe, Identity};

use super::{Exchange, Mailbox};

/// Runs a set of exchanges over one pipe target until all of them, and all
/// of their successors, are complete
pub struct Conversation {
    pipe: Box<dyn Pipe>,
    target: Identity,
    mailbox: Mailbox,
    pending: Vec<Box<dyn Exchange>>,
    active: Vec<Box<dyn Exchange>>,
}

impl Conversation {
    pub fn new(mut pipe: Box<dyn Pipe>, target: Identity, exchanges: Vec<Box<dyn Exchange>>) -> Self {
        pipe.register(target);
        Self {
            pipe,
            target,
            mailbox: Mailbox::new(),
            pending: exchanges,
            active: Vec::new(),
        }
    }

    /// Receives, advances every exchange, sends, and delivers. Returns
    /// whether the conversation is finished.
    pub fn update(&mut self) -> bool {
        self.mailbox.receive(self.pipe.receive(self.target));

        loop {
            for mut exchange in self.pending.drain(..) {
                exchange.enter(&mut self.mailbox);
                self.active.push(exchange);
            }

            let mut successors = Vec::new();
            let mut still_active = Vec::with_capacity(self.active.len());
            for mut exchange in self.active.drain(..) {
                exchange.update(&mut self.mailbox);
                if exchange.is_complete() {
                    exchange.exit(&mut self.mailbox);
                    successors.extend(exchange.successors());
                } else {
                    still_active.push(exchange);
                }
            }
            self.active = still_active;

            if successors.is_empty() {
                break;
            }
            self.pending = successors;
        }

        for (flavor, payload) in self.mailbox.drain_outbox() {
            self.pipe.send(self.target, flavor, &payload);
        }
        self.pipe.deliver();

        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty() && self.active.is_empty()
    }

    pub fn target(&self) -> Identity {
        self.target
    }

    pub fn pipe(&self) -> &dyn Pipe {
        self.pipe.as_ref()
    }

    pub fn pipe_mut(&mut self) -> &mut dyn Pipe {
        self.pipe.as_mut()
    }

    /// Ends the conversation, handing the pipe on to whoever needs it next
    pub fn into_pipe(self) -> Box<dyn Pipe> {
        self.pipe
    }
}
