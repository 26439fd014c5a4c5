use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use serde::{de::DeserializeOwned, Serialize};

use crate::{token::short_type_name, Flavor, Token};

use super::PackError;

type EncodeFn = fn(&dyn Token) -> Result<Vec<u8>, PackError>;
type DecodeFn = fn(&[u8]) -> Result<Box<dyn Token>, PackError>;

struct TokenKind {
    encode: EncodeFn,
    decode: DecodeFn,
}

/// Registry of every token type that can travel by value
#[derive(Default)]
pub struct TokenKinds {
    current_net_id: Flavor,
    kind_map: HashMap<TypeId, Flavor>,
    net_id_map: HashMap<Flavor, TokenKind>,
}

impl TokenKinds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token<T: Token + Clone + Serialize + DeserializeOwned>(&mut self) {
        let type_id = TypeId::of::<T>();
        if self.kind_map.contains_key(&type_id) {
            return;
        }

        let net_id = self.current_net_id;
        self.kind_map.insert(type_id, net_id);
        self.net_id_map.insert(
            net_id,
            TokenKind {
                encode: encode::<T>,
                decode: decode::<T>,
            },
        );
        self.current_net_id += 1;
    }

    pub fn is_registered<T: Token>(&self) -> bool {
        self.kind_map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.kind_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kind_map.is_empty()
    }

    pub fn encode(&self, token: &dyn Token) -> Result<(Flavor, Vec<u8>), PackError> {
        let net_id = self
            .kind_map
            .get(&Any::type_id(token.as_any()))
            .copied()
            .ok_or(PackError::TokenNotRegistered {
                token: token.token_name(),
            })?;
        let kind = self
            .net_id_map
            .get(&net_id)
            .ok_or(PackError::UnknownTokenFlavor { flavor: net_id })?;
        Ok((net_id, (kind.encode)(token)?))
    }

    pub fn decode(&self, net_id: Flavor, bytes: &[u8]) -> Result<Box<dyn Token>, PackError> {
        let kind = self
            .net_id_map
            .get(&net_id)
            .ok_or(PackError::UnknownTokenFlavor { flavor: net_id })?;
        (kind.decode)(bytes)
    }
}

fn encode<T: Token + Serialize>(token: &dyn Token) -> Result<Vec<u8>, PackError> {
    let token = token
        .downcast_ref::<T>()
        .ok_or(PackError::TokenNotRegistered {
            token: short_type_name::<T>(),
        })?;
    Ok(bincode::serialize(token)?)
}

fn decode<T: Token + Clone + DeserializeOwned>(bytes: &[u8]) -> Result<Box<dyn Token>, PackError> {
    let token: T = bincode::deserialize(bytes)?;
    Ok(Box::new(token))
}
