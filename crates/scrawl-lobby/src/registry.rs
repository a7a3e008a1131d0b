//! The parser registry: routes raw messages to typed decoders.
//!
//! Each entry maps an envelope `type` to an ordered list of decoders.
//! A decoder is bound to one payload schema ([`Inbound`]) and carries a
//! success callback plus an optional failure callback. Dispatch decodes the
//! envelope header once, then hands the raw text to every decoder for that
//! type in registration order.
//!
//! `C` is the context the callbacks mutate. The lobby uses its
//! [`LobbyState`](crate::LobbyState); tests can use anything.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use scrawl_protocol::{Codec, Envelope, EnvelopeHeader, Inbound, JsonCodec, ProtocolError};

use crate::LobbyError;

/// Identifies a registered decoder so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoderId(u64);

/// Everything a failure callback gets to see about a rejected message.
pub struct ParseFailure<'a> {
    /// The type the decoder was registered for.
    pub expected: &'a str,
    /// The payload, if it decoded before being rejected.
    pub decoded: Option<&'a dyn fmt::Debug>,
    /// The raw message text.
    pub raw: &'a str,
    pub error: &'a ProtocolError,
}

type SuccessFn<C, T> = Box<dyn FnMut(&mut C, T, &str) -> Result<(), LobbyError> + Send>;
type FailureFn<C> = Box<dyn FnMut(&mut C, &ParseFailure<'_>) + Send>;

/// A decoder for payload type `T`, built before registration.
///
/// ```rust
/// use scrawl_lobby::Decoder;
/// use scrawl_protocol::inbound::SystemMessage;
///
/// let decoder = Decoder::new(|log: &mut Vec<String>, msg: SystemMessage, _raw: &str| {
///     log.push(msg.0);
///     Ok(())
/// })
/// .on_failure(|_log, failure| eprintln!("bad {}: {}", failure.expected, failure.error));
/// # let _ = decoder;
/// ```
pub struct Decoder<C, T: Inbound> {
    on_success: SuccessFn<C, T>,
    on_failure: Option<FailureFn<C>>,
}

impl<C, T: Inbound> Decoder<C, T> {
    pub fn new<F>(on_success: F) -> Self
    where
        F: FnMut(&mut C, T, &str) -> Result<(), LobbyError> + Send + 'static,
    {
        Self {
            on_success: Box::new(on_success),
            on_failure: None,
        }
    }

    pub fn on_failure<F>(mut self, on_failure: F) -> Self
    where
        F: FnMut(&mut C, &ParseFailure<'_>) + Send + 'static,
    {
        self.on_failure = Some(Box::new(on_failure));
        self
    }
}

/// Type-erased decoder, so decoders for different payloads share a list.
trait ErasedDecoder<C>: Send {
    fn handle(&mut self, ctx: &mut C, key: &str, raw: &str) -> Result<(), LobbyError>;
}

struct Typed<C, T: Inbound> {
    decoder: Decoder<C, T>,
    _payload: PhantomData<fn() -> T>,
}

impl<C, T: Inbound> Typed<C, T> {
    fn fail(
        &mut self,
        ctx: &mut C,
        key: &str,
        raw: &str,
        decoded: Option<&T>,
        error: ProtocolError,
    ) -> Result<(), LobbyError> {
        if let Some(on_failure) = self.decoder.on_failure.as_mut() {
            let failure = ParseFailure {
                expected: key,
                decoded: decoded.map(|d| d as &dyn fmt::Debug),
                raw,
                error: &error,
            };
            on_failure(ctx, &failure);
        }
        Err(error.into())
    }
}

impl<C, T: Inbound> ErasedDecoder<C> for Typed<C, T> {
    fn handle(&mut self, ctx: &mut C, key: &str, raw: &str) -> Result<(), LobbyError> {
        let envelope: Envelope<T> = match JsonCodec.decode(raw) {
            Ok(envelope) => envelope,
            Err(e) => return self.fail(ctx, key, raw, None, e),
        };
        if envelope.kind != T::TYPE || key != T::TYPE {
            let error = ProtocolError::TypeMismatch {
                expected: T::TYPE.to_owned(),
                found: envelope.kind.clone(),
            };
            return self.fail(ctx, key, raw, envelope.data.as_ref(), error);
        }
        let Some(payload) = envelope.into_payload() else {
            let error = ProtocolError::InvalidMessage(format!("`{key}` message has no data"));
            return self.fail(ctx, key, raw, None, error);
        };
        if !payload.is_valid() {
            let error = ProtocolError::InvalidMessage(format!("`{key}` payload failed validation"));
            return self.fail(ctx, key, raw, Some(&payload), error);
        }
        (self.decoder.on_success)(ctx, payload, raw)
    }
}

/// What happened to one dispatched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// At least one decoder was registered for the type. `rejected` counts
    /// decoders that failed to parse or whose callback returned an error.
    Routed { decoders: usize, rejected: usize },
    /// No decoder is registered for this type.
    Unknown(EnvelopeHeader),
}

/// Routes raw messages by their envelope `type`.
pub struct ParserRegistry<C> {
    entries: HashMap<String, Vec<(DecoderId, Box<dyn ErasedDecoder<C>>)>>,
    next_id: u64,
}

impl<C: 'static> ParserRegistry<C> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 0,
        }
    }

    /// Registers a decoder under its payload's own type.
    pub fn register<T: Inbound>(&mut self, decoder: Decoder<C, T>) -> DecoderId {
        self.register_as(T::TYPE, decoder)
    }

    /// Registers a decoder under an explicit key.
    ///
    /// A key that differs from `T::TYPE` makes every message routed to this
    /// decoder fail with a type mismatch.
    pub fn register_as<T: Inbound>(
        &mut self,
        key: impl Into<String>,
        decoder: Decoder<C, T>,
    ) -> DecoderId {
        let id = DecoderId(self.next_id);
        self.next_id += 1;
        let erased: Box<dyn ErasedDecoder<C>> = Box::new(Typed {
            decoder,
            _payload: PhantomData,
        });
        self.entries.entry(key.into()).or_default().push((id, erased));
        id
    }

    /// Removes a decoder. When it was the last one for its type, the type
    /// becomes unknown again. Returns `false` if `id` was not registered.
    pub fn unregister(&mut self, id: DecoderId) -> bool {
        let Some(key) = self
            .entries
            .iter()
            .find(|(_, decoders)| decoders.iter().any(|(d, _)| *d == id))
            .map(|(key, _)| key.clone())
        else {
            return false;
        };
        if let Some(decoders) = self.entries.get_mut(&key) {
            decoders.retain(|(d, _)| *d != id);
            if decoders.is_empty() {
                self.entries.remove(&key);
            }
        }
        true
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of decoders registered for `key`.
    pub fn decoder_count(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, Vec::len)
    }

    /// Routes one raw message to every decoder registered for its type.
    ///
    /// Decoder failures never escape: they are handed to the failure
    /// callback, logged, and counted in [`Dispatch::Routed`].
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` only if `raw` is not an envelope at
    /// all (not JSON, or no `type`).
    pub fn dispatch(&mut self, ctx: &mut C, raw: &str) -> Result<Dispatch, ProtocolError> {
        let header: EnvelopeHeader = JsonCodec.decode(raw)?;
        let Some(decoders) = self.entries.get_mut(&header.kind) else {
            return Ok(Dispatch::Unknown(header));
        };

        let mut rejected = 0;
        for (_, decoder) in decoders.iter_mut() {
            if let Err(e) = decoder.handle(ctx, &header.kind, raw) {
                rejected += 1;
                tracing::warn!(msg_type = %header.kind, error = %e, "message rejected");
            }
        }
        Ok(Dispatch::Routed {
            decoders: decoders.len(),
            rejected,
        })
    }
}

impl<C: 'static> Default for ParserRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ParserRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("ParserRegistry").field("types", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrawl_protocol::inbound::{ChatMessage, NameChange, SystemMessage};

    #[derive(Default)]
    struct Log {
        seen: Vec<String>,
        failures: Vec<(String, bool)>,
    }

    fn system_decoder(tag: &'static str) -> Decoder<Log, SystemMessage> {
        Decoder::new(move |log: &mut Log, msg: SystemMessage, _raw: &str| {
            log.seen.push(format!("{tag}:{}", msg.0));
            Ok(())
        })
    }

    const SYSTEM: &str = r#"{"type":"system-message","data":"round over"}"#;

    #[test]
    fn test_dispatch_fans_out_in_registration_order() {
        let mut registry = ParserRegistry::new();
        registry.register(system_decoder("a"));
        registry.register(system_decoder("b"));
        let mut log = Log::default();

        let outcome = registry.dispatch(&mut log, SYSTEM).unwrap();

        assert_eq!(outcome, Dispatch::Routed { decoders: 2, rejected: 0 });
        assert_eq!(log.seen, vec!["a:round over", "b:round over"]);
    }

    #[test]
    fn test_dispatch_unknown_type_reports_header() {
        let mut registry: ParserRegistry<Log> = ParserRegistry::new();
        let mut log = Log::default();
        let outcome = registry
            .dispatch(&mut log, r#"{"type":"frobnicate","data":{}}"#)
            .unwrap();
        assert_eq!(outcome, Dispatch::Unknown(EnvelopeHeader { kind: "frobnicate".into() }));
    }

    #[test]
    fn test_dispatch_non_envelope_is_error() {
        let mut registry: ParserRegistry<Log> = ParserRegistry::new();
        let mut log = Log::default();
        assert!(registry.dispatch(&mut log, "[1,2,3]").is_err());
        assert!(registry.dispatch(&mut log, "not json").is_err());
    }

    #[test]
    fn test_failure_callback_gets_expected_type_and_raw() {
        let mut registry = ParserRegistry::new();
        registry.register(
            Decoder::new(|log: &mut Log, msg: NameChange, _raw: &str| {
                log.seen.push(msg.new_name);
                Ok(())
            })
            .on_failure(|log: &mut Log, failure| {
                log.failures.push((failure.expected.to_owned(), failure.decoded.is_some()));
                assert!(failure.raw.contains("name-change"));
            }),
        );
        let mut log = Log::default();

        // Decodes, then fails validation: the payload is passed along.
        let invalid = r#"{"type":"name-change","data":{"playerID":"p1","newName":""}}"#;
        let outcome = registry.dispatch(&mut log, invalid).unwrap();
        assert_eq!(outcome, Dispatch::Routed { decoders: 1, rejected: 1 });

        // Does not decode at all: nothing to pass along.
        let malformed = r#"{"type":"name-change","data":{"playerID":7}}"#;
        registry.dispatch(&mut log, malformed).unwrap();

        assert!(log.seen.is_empty());
        assert_eq!(
            log.failures,
            vec![("name-change".to_owned(), true), ("name-change".to_owned(), false)]
        );
    }

    #[test]
    fn test_decoder_under_foreign_key_is_type_mismatch() {
        let mut registry = ParserRegistry::new();
        registry.register_as(
            "message",
            Decoder::new(|log: &mut Log, msg: SystemMessage, _raw: &str| {
                log.seen.push(msg.0);
                Ok(())
            })
            .on_failure(|log: &mut Log, failure| {
                match failure.error {
                    ProtocolError::TypeMismatch { expected, found } => {
                        assert_eq!(expected, "system-message");
                        assert_eq!(found, "message");
                    }
                    other => panic!("expected a type mismatch, got {other}"),
                }
                log.failures.push((failure.expected.to_owned(), failure.decoded.is_some()));
            }),
        );
        let mut log = Log::default();
        registry
            .dispatch(&mut log, r#"{"type":"message","data":"hi"}"#)
            .unwrap();
        assert!(log.seen.is_empty());
        assert_eq!(log.failures, vec![("message".to_owned(), true)]);
    }

    #[test]
    fn test_dispatch_dataless_envelope_uses_fallback_payload() {
        use scrawl_protocol::inbound::DrawerKicked;

        let mut registry = ParserRegistry::new();
        registry.register(Decoder::new(|log: &mut Log, _: DrawerKicked, _: &str| {
            log.seen.push("kicked".into());
            Ok(())
        }));
        registry.register(system_decoder("s"));
        let mut log = Log::default();

        let kicked = registry.dispatch(&mut log, r#"{"type":"drawer-kicked"}"#).unwrap();
        assert_eq!(kicked, Dispatch::Routed { decoders: 1, rejected: 0 });

        // A type whose payload is required rejects an envelope without one.
        let empty = registry.dispatch(&mut log, r#"{"type":"system-message"}"#).unwrap();
        assert_eq!(empty, Dispatch::Routed { decoders: 1, rejected: 1 });

        assert_eq!(log.seen, vec!["kicked"]);
    }

    #[test]
    fn test_one_failing_decoder_does_not_stop_the_others() {
        let mut registry = ParserRegistry::new();
        registry.register(Decoder::new(|_: &mut Log, _: ChatMessage, _: &str| {
            Err(LobbyError::Data("nope".into()))
        }));
        registry.register(Decoder::new(|log: &mut Log, msg: ChatMessage, _: &str| {
            log.seen.push(msg.0.content);
            Ok(())
        }));
        let mut log = Log::default();
        let outcome = registry
            .dispatch(
                &mut log,
                r#"{"type":"message","data":{"author":"Bob","authorID":"p2","content":"hey"}}"#,
            )
            .unwrap();
        assert_eq!(outcome, Dispatch::Routed { decoders: 2, rejected: 1 });
        assert_eq!(log.seen, vec!["hey"]);
    }

    #[test]
    fn test_unregister_last_decoder_drops_key() {
        let mut registry = ParserRegistry::new();
        let first = registry.register(system_decoder("a"));
        let second = registry.register(system_decoder("b"));

        assert!(registry.unregister(first));
        assert_eq!(registry.decoder_count("system-message"), 1);
        assert!(registry.unregister(second));
        assert!(!registry.is_registered("system-message"));
        assert!(!registry.unregister(second));

        let mut log = Log::default();
        let outcome = registry.dispatch(&mut log, SYSTEM).unwrap();
        assert!(matches!(outcome, Dispatch::Unknown(_)));
    }
}
