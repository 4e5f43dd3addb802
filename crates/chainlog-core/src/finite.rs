//! Rejects payloads carrying NaN or infinite floats.
//!
//! `serde_json` quietly turns non-finite floats into `null`, which would
//! record something other than what the caller passed. [`check_finite`]
//! walks the value with a serializer that produces nothing and fails on the
//! first non-finite `f32`/`f64`, so the ledger can refuse the payload before
//! converting it.

use std::fmt;

use serde::ser::{self, Serialize, Serializer};

/// Why a payload failed the finiteness walk.
#[derive(Debug)]
pub struct NonFiniteFloat(String);

impl fmt::Display for NonFiniteFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for NonFiniteFloat {}

impl ser::Error for NonFiniteFloat {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

/// Fail if any float reachable from `value` is NaN or infinite.
///
/// Errors raised by `value`'s own `Serialize` impl are passed through, so
/// callers still see those when they convert afterwards.
pub fn check_finite<T: Serialize + ?Sized>(value: &T) -> Result<(), NonFiniteFloat> {
    value.serialize(FiniteWalk)
}

struct FiniteWalk;

fn check_float(v: f64) -> Result<(), NonFiniteFloat> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(NonFiniteFloat(format!("non-finite float {v} cannot be represented in JSON")))
    }
}

impl Serializer for FiniteWalk {
    type Ok = ();
    type Error = NonFiniteFloat;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Result<(), NonFiniteFloat> {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), NonFiniteFloat> {
        check_float(v)
    }

    fn serialize_bool(self, _: bool) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_i8(self, _: i8) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_i16(self, _: i16) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_i32(self, _: i32) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_i64(self, _: i64) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_i128(self, _: i128) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_u8(self, _: u8) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_u16(self, _: u16) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_u32(self, _: u32) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_u64(self, _: u64) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_u128(self, _: u128) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_char(self, _: char) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_str(self, _: &str) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_none(self) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), NonFiniteFloat> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), NonFiniteFloat> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), NonFiniteFloat> {
        value.serialize(self)
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self, NonFiniteFloat> {
        Ok(self)
    }
    fn serialize_tuple(self, _: usize) -> Result<Self, NonFiniteFloat> {
        Ok(self)
    }
    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, NonFiniteFloat> {
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, NonFiniteFloat> {
        Ok(self)
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self, NonFiniteFloat> {
        Ok(self)
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, NonFiniteFloat> {
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, NonFiniteFloat> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteWalk {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFiniteFloat> {
        value.serialize(FiniteWalk)
    }
    fn end(self) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteWalk {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFiniteFloat> {
        value.serialize(FiniteWalk)
    }
    fn end(self) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteWalk {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFiniteFloat> {
        value.serialize(FiniteWalk)
    }
    fn end(self) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteWalk {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFiniteFloat> {
        value.serialize(FiniteWalk)
    }
    fn end(self) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteWalk {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), NonFiniteFloat> {
        key.serialize(FiniteWalk)
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), NonFiniteFloat> {
        value.serialize(FiniteWalk)
    }
    fn end(self) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteWalk {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Result<(), NonFiniteFloat> {
        value.serialize(FiniteWalk)
    }
    fn end(self) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteWalk {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Result<(), NonFiniteFloat> {
        value.serialize(FiniteWalk)
    }
    fn end(self) -> Result<(), NonFiniteFloat> {
        Ok(())
    }
}
