//! The two schemas the notes app stores its documents under.

use enotes_types::{SchemaDocument, SchemaError, SchemaNode};

pub const ENCRYPTED_NOTE: &str = "EncryptedNote";
pub const NOTES_LIST: &str = "NotesList";

const CERAMIC_STREAM_ID: &str = "CeramicStreamId";
const STREAM_URL_PATTERN: &str = r"^ceramic://.+(\\?version=.+)?";

/// A note encrypted as a general-form JWE.
pub fn encrypted_note() -> Result<SchemaDocument, SchemaError> {
    let header = SchemaNode::object()
        .property("alg", SchemaNode::string())
        .property("iv", SchemaNode::string())
        .property("tag", SchemaNode::string())
        .property("epk", SchemaNode::object())
        .property("kid", SchemaNode::string())
        .required(["alg", "iv", "tag"]);

    let recipient = SchemaNode::object()
        .property("header", header)
        .property("encrypted_key", SchemaNode::string())
        .required(["header", "encrypted_key"]);

    let root = SchemaNode::object()
        .property("protected", SchemaNode::string())
        .property("iv", SchemaNode::string())
        .property("ciphertext", SchemaNode::string())
        .property("tag", SchemaNode::string())
        .property("aad", SchemaNode::string())
        .property("recipients", SchemaNode::array(recipient))
        .required(["protected", "iv", "ciphertext", "tag"]);

    SchemaDocument::new(ENCRYPTED_NOTE, root, std::iter::empty())
}

/// Index of a user's notes: stream URL plus a short title for each.
pub fn notes_list() -> Result<SchemaDocument, SchemaError> {
    let item = SchemaNode::object()
        .titled("EncryptedNoteItem")
        .property("id", SchemaNode::definition(CERAMIC_STREAM_ID))
        .property("title", SchemaNode::string().titled("title").max_length(100));

    let root = SchemaNode::object().property("notes", SchemaNode::array(item).titled("notes"));

    SchemaDocument::new(
        NOTES_LIST,
        root,
        [(
            CERAMIC_STREAM_ID.to_string(),
            SchemaNode::string().pattern(STREAM_URL_PATTERN).max_length(150),
        )],
    )
}
