use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use serde::{de::DeserializeOwned, Serialize};

use crate::{token::short_type_name, Flavor, Message};

use super::PackError;

type EncodeFn = fn(&dyn Message) -> Result<Vec<u8>, PackError>;
type DecodeFn = fn(&[u8]) -> Result<Box<dyn Message>, PackError>;

struct MessageKind {
    encode: EncodeFn,
    decode: DecodeFn,
}

/// Registry of every message type a forum can carry. Flavors are handed out
/// in registration order, so both ends must register identically.
#[derive(Default)]
pub struct MessageKinds {
    current_net_id: Flavor,
    kind_map: HashMap<TypeId, Flavor>,
    net_id_map: HashMap<Flavor, MessageKind>,
}

impl MessageKinds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message<M: Message + Serialize + DeserializeOwned>(&mut self) {
        let type_id = TypeId::of::<M>();
        if self.kind_map.contains_key(&type_id) {
            return;
        }

        let net_id = self.current_net_id;
        self.kind_map.insert(type_id, net_id);
        self.net_id_map.insert(
            net_id,
            MessageKind {
                encode: encode::<M>,
                decode: decode::<M>,
            },
        );
        self.current_net_id += 1;
    }

    pub fn is_registered<M: Message>(&self) -> bool {
        self.kind_map.contains_key(&TypeId::of::<M>())
    }

    pub fn len(&self) -> usize {
        self.kind_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kind_map.is_empty()
    }

    pub fn net_id_of(&self, message: &dyn Message) -> Result<Flavor, PackError> {
        self.kind_map
            .get(&Any::type_id(message.as_any()))
            .copied()
            .ok_or(PackError::MessageNotRegistered {
                message: message.message_name(),
            })
    }

    /// Serializes the message's own fields. Its core travels separately.
    pub fn encode(&self, message: &dyn Message) -> Result<(Flavor, Vec<u8>), PackError> {
        let net_id = self.net_id_of(message)?;
        let kind = self
            .net_id_map
            .get(&net_id)
            .ok_or(PackError::UnknownMessageFlavor { flavor: net_id })?;
        Ok((net_id, (kind.encode)(message)?))
    }

    pub fn decode(&self, net_id: Flavor, bytes: &[u8]) -> Result<Box<dyn Message>, PackError> {
        let kind = self
            .net_id_map
            .get(&net_id)
            .ok_or(PackError::UnknownMessageFlavor { flavor: net_id })?;
        (kind.decode)(bytes)
    }
}

fn encode<M: Message + Serialize>(message: &dyn Message) -> Result<Vec<u8>, PackError> {
    let message = message
        .downcast_ref::<M>()
        .ok_or(PackError::MessageNotRegistered {
            message: short_type_name::<M>(),
        })?;
    Ok(bincode::serialize(message)?)
}

fn decode<M: Message + DeserializeOwned>(bytes: &[u8]) -> Result<Box<dyn Message>, PackError> {
    let message: M = bincode::deserialize(bytes)?;
    Ok(Box::new(message))
}
