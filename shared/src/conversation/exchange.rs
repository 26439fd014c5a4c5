use std::marker::PhantomData;

use super::{Letter, Mailbox};

/// One step of a conversation.
///
/// A conversation enters an exchange, updates it until it is complete,
/// exits it, then enters whatever [`Exchange::successors`] it hands over.
pub trait Exchange: Send {
    fn enter(&mut self, _mailbox: &mut Mailbox) {}

    fn update(&mut self, _mailbox: &mut Mailbox) {}

    fn exit(&mut self, _mailbox: &mut Mailbox) {}

    fn is_complete(&self) -> bool;

    /// Exchanges to start once this one is done. Called once, after `exit`.
    fn successors(&mut self) -> Vec<Box<dyn Exchange>> {
        Vec::new()
    }
}

/// Sends one letter and is done
pub struct Inform<L: Letter> {
    letter: Option<L>,
}

impl<L: Letter> Inform<L> {
    pub fn new(letter: L) -> Self {
        Self {
            letter: Some(letter),
        }
    }
}

impl<L: Letter> Exchange for Inform<L> {
    fn enter(&mut self, mailbox: &mut Mailbox) {
        if let Some(letter) = self.letter.take() {
            mailbox.send(&letter);
        }
    }

    fn is_complete(&self) -> bool {
        self.letter.is_none()
    }
}

type RequestCallback<R> = Box<dyn FnMut(R) -> Vec<Box<dyn Exchange>> + Send>;

/// Sends a question, waits for the answer, and lets the callback decide what
/// comes next
pub struct Request<Q: Letter, R: Letter> {
    question: Option<Q>,
    callback: RequestCallback<R>,
    answered: bool,
    successors: Vec<Box<dyn Exchange>>,
}

impl<Q: Letter, R: Letter> Request<Q, R> {
    pub fn new(
        question: Q,
        callback: impl FnMut(R) -> Vec<Box<dyn Exchange>> + Send + 'static,
    ) -> Self {
        Self {
            question: Some(question),
            callback: Box::new(callback),
            answered: false,
            successors: Vec::new(),
        }
    }
}

impl<Q: Letter, R: Letter> Exchange for Request<Q, R> {
    fn enter(&mut self, mailbox: &mut Mailbox) {
        if let Some(question) = self.question.take() {
            mailbox.send(&question);
        }
    }

    fn update(&mut self, mailbox: &mut Mailbox) {
        if self.answered {
            return;
        }
        if let Some(answer) = mailbox.take::<R>() {
            self.successors = (self.callback)(answer);
            self.answered = true;
        }
    }

    fn is_complete(&self) -> bool {
        self.answered
    }

    fn successors(&mut self) -> Vec<Box<dyn Exchange>> {
        std::mem::take(&mut self.successors)
    }
}

type ReplyCallback<Q, R> = Box<dyn FnMut(Q) -> (R, Vec<Box<dyn Exchange>>) + Send>;

/// Waits for a question and answers it with whatever the callback returns
pub struct Reply<Q: Letter, R: Letter> {
    callback: ReplyCallback<Q, R>,
    answered: bool,
    successors: Vec<Box<dyn Exchange>>,
    phantom: PhantomData<fn(Q) -> R>,
}

impl<Q: Letter, R: Letter> Reply<Q, R> {
    pub fn new(callback: impl FnMut(Q) -> (R, Vec<Box<dyn Exchange>>) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            answered: false,
            successors: Vec::new(),
            phantom: PhantomData,
        }
    }
}

impl<Q: Letter, R: Letter> Exchange for Reply<Q, R> {
    fn update(&mut self, mailbox: &mut Mailbox) {
        if self.answered {
            return;
        }
        if let Some(question) = mailbox.take::<Q>() {
            let (answer, successors) = (self.callback)(question);
            mailbox.send(&answer);
            self.successors = successors;
            self.answered = true;
        }
    }

    fn is_complete(&self) -> bool {
        self.answered
    }

    fn successors(&mut self) -> Vec<Box<dyn Exchange>> {
        std::mem::take(&mut self.successors)
    }
}
