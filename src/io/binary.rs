//! Binary encoding of temporal values.
//!
//! A payload is a bincode header `{ magic, version, base type }` followed by
//! the bincode body. Decoding rebuilds the value through the validating
//! constructors, so a payload can never produce a value that breaks an
//! invariant.
use crate::base::{BaseType, BaseValue};
use crate::error::{Result, TemporaError};
use crate::temporal::{Interpolation, TInstant, TInstantSet, TSequence, TSequenceSet, Temporal};
use bytes::{BufMut, Bytes, BytesMut};
use log::warn;
use serde::{Deserialize, Serialize};

const MAGIC: [u8; 4] = *b"TMPR";
const VERSION: u16 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    magic: [u8; 4],
    version: u16,
    base_type: BaseType,
}

#[derive(Serialize, Deserialize)]
struct WireSequence<V> {
    instants: Vec<TInstant<V>>,
    lower_inc: bool,
    upper_inc: bool,
    interp: Interpolation,
}

#[derive(Serialize, Deserialize)]
enum Body<V> {
    Instant(TInstant<V>),
    InstantSet(Vec<TInstant<V>>),
    Sequence(WireSequence<V>),
    SequenceSet(Vec<WireSequence<V>>),
}

impl<V: BaseValue> WireSequence<V> {
    fn from_sequence(seq: &TSequence<V>) -> Self {
        Self {
            instants: seq.instants().to_vec(),
            lower_inc: seq.lower_inc(),
            upper_inc: seq.upper_inc(),
            interp: seq.interpolation(),
        }
    }

    fn into_sequence(self) -> Result<TSequence<V>> {
        TSequence::new(self.instants, self.lower_inc, self.upper_inc, self.interp)
    }
}

fn rejected(reason: String) -> TemporaError {
    warn!("Rejected binary temporal payload: {}", reason);
    TemporaError::Serialization(reason)
}

/// Encode a temporal value.
///
/// # Examples
///
/// ```
/// use tempora::prelude::*;
/// use tempora::io::{from_bytes, to_bytes};
///
/// let temp: Temporal<f64> = "[1@2000-01-01, 2@2000-01-02)".parse().unwrap();
/// let bytes = to_bytes(&temp).unwrap();
/// assert_eq!(from_bytes::<f64>(&bytes).unwrap(), temp);
/// assert!(from_bytes::<i32>(&bytes).is_err());
/// ```
pub fn to_bytes<V: BaseValue>(temp: &Temporal<V>) -> Result<Bytes> {
    let header = Header {
        magic: MAGIC,
        version: VERSION,
        base_type: V::BASE_TYPE,
    };
    let body = match temp {
        Temporal::Instant(inst) => Body::Instant(inst.clone()),
        Temporal::InstantSet(set) => Body::InstantSet(set.instants().to_vec()),
        Temporal::Sequence(seq) => Body::Sequence(WireSequence::from_sequence(seq)),
        Temporal::SequenceSet(set) => {
            Body::SequenceSet(set.sequences().iter().map(WireSequence::from_sequence).collect())
        }
    };
    let mut writer = BytesMut::with_capacity(64 + temp.num_instants() * 16).writer();
    bincode::serialize_into(&mut writer, &header)?;
    bincode::serialize_into(&mut writer, &body)?;
    Ok(writer.into_inner().freeze())
}

/// Decode a temporal value over the domain `V`.
///
/// Fails with [`TemporaError::Serialization`] on a wrong magic, version or
/// base type, on truncated or trailing data, and with the constructor's error
/// when the decoded instants break an invariant.
pub fn from_bytes<V: BaseValue>(bytes: &[u8]) -> Result<Temporal<V>> {
    let mut reader = bytes;
    let header: Header =
        bincode::deserialize_from(&mut reader).map_err(|e| rejected(format!("bad header: {}", e)))?;
    if header.magic != MAGIC {
        return Err(rejected(format!("bad magic {:?}", header.magic)));
    }
    if header.version != VERSION {
        return Err(rejected(format!("unsupported version {}", header.version)));
    }
    if header.base_type != V::BASE_TYPE {
        return Err(rejected(format!(
            "payload holds a {}, expected a {}",
            header.base_type,
            V::BASE_TYPE
        )));
    }
    let body: Body<V> = bincode::deserialize_from(&mut reader).map_err(|e| rejected(format!("bad body: {}", e)))?;
    if !reader.is_empty() {
        return Err(rejected(format!("{} trailing bytes", reader.len())));
    }

    match body {
        Body::Instant(inst) => {
            let t = inst.timestamp();
            Temporal::instant(inst.into_value(), t)
        }
        Body::InstantSet(instants) => Ok(Temporal::InstantSet(TInstantSet::new(instants)?)),
        Body::Sequence(seq) => Ok(Temporal::Sequence(seq.into_sequence()?)),
        Body::SequenceSet(sequences) => Ok(Temporal::SequenceSet(TSequenceSet::new(
            sequences
                .into_iter()
                .map(WireSequence::into_sequence)
                .collect::<Result<Vec<_>>>()?,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempora_types::GeoPoint;

    fn roundtrip<V: BaseValue>(text: &str) {
        let temp: Temporal<V> = text.parse().unwrap();
        let bytes = to_bytes(&temp).unwrap();
        assert_eq!(from_bytes::<V>(&bytes).unwrap(), temp, "{}", text);
    }

    #[test]
    fn test_roundtrip_shapes() {
        roundtrip::<i32>("5@2000-01-01");
        roundtrip::<bool>("{t@2000-01-01, f@2000-01-02}");
        roundtrip::<f64>("(1.5@2000-01-01, 2.5@2000-01-02, 1@2000-01-03]");
        roundtrip::<String>(r#"{["a"@2000-01-01, "b"@2000-01-02], ["c"@2000-01-04, "c"@2000-01-05]}"#);
        roundtrip::<GeoPoint>("SRID=4326;[POINT(0 0)@2000-01-01, POINT(1 1)@2000-01-02]");
    }

    #[test]
    fn test_rejects_wrong_domain() {
        let temp: Temporal<f64> = "1@2000-01-01".parse().unwrap();
        let bytes = to_bytes(&temp).unwrap();
        let err = from_bytes::<i32>(&bytes).unwrap_err();
        assert!(matches!(err, TemporaError::Serialization(_)));
    }

    #[test]
    fn test_rejects_corruption() {
        let temp: Temporal<f64> = "[1@2000-01-01, 2@2000-01-02]".parse().unwrap();
        let bytes = to_bytes(&temp).unwrap();

        let mut bad_magic = bytes.to_vec();
        bad_magic[0] = b'X';
        assert!(from_bytes::<f64>(&bad_magic).is_err());

        assert!(from_bytes::<f64>(&bytes[..bytes.len() - 3]).is_err());

        let mut trailing = bytes.to_vec();
        trailing.push(0);
        assert!(from_bytes::<f64>(&trailing).is_err());
    }

    #[test]
    fn test_decoding_validates_instants() {
        let header = Header {
            magic: MAGIC,
            version: VERSION,
            base_type: BaseType::Int,
        };
        let t = tempora_types::Timestamp::from_secs(10);
        let body: Body<i32> = Body::InstantSet(vec![TInstant::new(1, t), TInstant::new(2, t)]);
        let mut payload = bincode::serialize(&header).unwrap();
        payload.extend(bincode::serialize(&body).unwrap());
        let err = from_bytes::<i32>(&payload).unwrap_err();
        assert!(matches!(err, TemporaError::InvalidArgument(_)));
    }
}
