use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::Arc,
};

use cirrus_parser::Message;

use crate::error::DispatchError;

/// Token of the handler receiving every command without a handler of its own.
pub const DEFAULT_HANDLER: &str = "default";

pub type Handler<C> = Arc<dyn Fn(&C, &Message) + Send + Sync>;

/// Handlers by command token, fixed once built.
///
/// A token is a command word (`"PRIVMSG"`) or a numeric code (`"433"`), both matched
/// exactly against the received command.
pub struct DispatchTable<C> {
    handlers: HashMap<String, Handler<C>>,
    default: Handler<C>,
}

impl<C> DispatchTable<C> {
    pub fn new<I, T>(registrations: I) -> Result<Self, DispatchError>
    where
        I: IntoIterator<Item = (T, Handler<C>)>,
        T: Into<String>,
    {
        let mut handlers = HashMap::new();
        for (command, handler) in registrations {
            match handlers.entry(command.into()) {
                Entry::Occupied(entry) => {
                    return Err(DispatchError::DuplicateHandler {
                        command: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(handler);
                }
            }
        }

        let default = handlers
            .remove(DEFAULT_HANDLER)
            .ok_or(DispatchError::MissingDefaultHandler)?;

        Ok(Self { handlers, default })
    }

    pub fn handles(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    pub fn handler_for(&self, command: &str) -> &Handler<C> {
        self.handlers.get(command).unwrap_or(&self.default)
    }

    /// Run the handler of the message's command, synchronously.
    pub fn dispatch(&self, context: &C, message: &Message) {
        let handler = self.handler_for(message.command());
        handler(context, message);
    }
}

impl<C> fmt::Debug for DispatchTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands = self.handlers.keys().collect::<Vec<_>>();
        commands.sort();
        f.debug_struct("DispatchTable")
            .field("commands", &commands)
            .finish_non_exhaustive()
    }
}

/// Collects registrations for a [`DispatchTable`].
pub struct HandlerSet<C> {
    registrations: Vec<(String, Handler<C>)>,
}

impl<C> Default for HandlerSet<C> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }
}

impl<C> HandlerSet<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(mut self, command: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&C, &Message) + Send + Sync + 'static,
    {
        let handler: Handler<C> = Arc::new(handler);
        self.registrations.push((command.into(), handler));
        self
    }

    /// Register one handler for several tokens.
    pub fn on_each<F>(mut self, commands: &[&str], handler: F) -> Self
    where
        F: Fn(&C, &Message) + Send + Sync + 'static,
    {
        let handler: Handler<C> = Arc::new(handler);
        for command in commands {
            self.registrations
                .push((command.to_string(), Arc::clone(&handler)));
        }
        self
    }

    pub fn on_default<F>(self, handler: F) -> Self
    where
        F: Fn(&C, &Message) + Send + Sync + 'static,
    {
        self.on(DEFAULT_HANDLER, handler)
    }

    pub fn build(self) -> Result<DispatchTable<C>, DispatchError> {
        DispatchTable::new(self.registrations)
    }
}
