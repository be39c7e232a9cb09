//! Command handlers: leaf actions, child processors and default handlers.

use crate::binding::SlotAccessor;
use crate::error::Result;
use crate::queue::TokenQueue;

use super::CommandProcessor;

/// A leaf action: receives whatever is left of the queue.
pub type Action<S> = Box<dyn Fn(&mut TokenQueue, &mut S) -> Result<()>>;

/// A default handler: runs with the processor it is attached to, so it
/// can still route option tokens through that processor's option table.
pub type Fallback<S> = Box<dyn Fn(&CommandProcessor<S>, &mut TokenQueue, &mut S) -> Result<()>>;

/// Something that takes over the rest of the queue for a parent state.
pub trait Delegate<S> {
    fn dispatch(&self, queue: &mut TokenQueue, state: &mut S) -> Result<()>;
}

/// A child processor reached through a field of the parent state.
pub struct ChildProcessor<S, C> {
    processor: CommandProcessor<C>,
    slot: SlotAccessor<S, C>,
}

impl<S, C> ChildProcessor<S, C> {
    pub fn new(processor: CommandProcessor<C>, slot: SlotAccessor<S, C>) -> Self {
        Self { processor, slot }
    }
}

impl<S, C: 'static> Delegate<S> for ChildProcessor<S, C> {
    fn dispatch(&self, queue: &mut TokenQueue, state: &mut S) -> Result<()> {
        self.processor.process(queue, (self.slot)(state))
    }
}

pub enum CommandHandler<S> {
    Leaf(Action<S>),
    Child(Box<dyn Delegate<S>>),
}

impl<S: 'static> CommandHandler<S> {
    pub fn leaf(action: impl Fn(&mut TokenQueue, &mut S) -> Result<()> + 'static) -> Self {
        CommandHandler::Leaf(Box::new(action))
    }

    pub fn child<C: 'static>(processor: CommandProcessor<C>, slot: SlotAccessor<S, C>) -> Self {
        CommandHandler::Child(Box::new(ChildProcessor::new(processor, slot)))
    }

    pub(crate) fn invoke(&self, queue: &mut TokenQueue, state: &mut S) -> Result<()> {
        match self {
            CommandHandler::Leaf(action) => action(queue, state),
            CommandHandler::Child(delegate) => delegate.dispatch(queue, state),
        }
    }
}

/// What runs when option scanning stops without a command.
pub enum DefaultHandler<S> {
    /// Report the token that stopped the scan, if any.
    Unrecognized,
    Custom(Fallback<S>),
}

impl<S> DefaultHandler<S> {
    pub fn custom(
        fallback: impl Fn(&CommandProcessor<S>, &mut TokenQueue, &mut S) -> Result<()> + 'static,
    ) -> Self {
        DefaultHandler::Custom(Box::new(fallback))
    }
}
