//! Wire records shared by the `halprobed` driver and its test agents.
//!
//! Every exchange on a session socket is one [`CommandRecord`] followed by
//! one [`ResponseRecord`], each serialised as a single JSON line. Function
//! calls travel as a [`FunctionSpecDescription`] embedded in the command's
//! `arg` field; their outcome returns as a [`FunctionResult`] in the
//! response's `return_message`. Arguments and results share one recursive
//! value model, [`VariableValue`], which carries its own type tag so
//! verification can match on the tag rather than trusting the caller.

mod callback;
mod codec;
mod command;
mod function;
mod interface;
mod value;

pub use callback::CallbackRequest;
pub use codec::{CodecError, decode_text, encode_text};
pub use command::{Command, CommandRecord, CommandType, LoadRequest, ResponseCode, ResponseRecord};
pub use function::{CallTarget, FunctionResult, FunctionSpecDescription, VerificationDescription};
pub use interface::{
    AttributeSpec, ComponentClass, FunctionSignature, InterfaceSpecification,
    UnknownComponentClass,
};
pub use value::{ScalarKind, ScalarValue, TypeDescriptor, VariableValue};
