//! Unit tests for the wire codec.

use time::OffsetDateTime;
use time::macros::datetime;

use crate::model::{MaterialData, PropertyConfiguration, Revision};


fn configuration() -> PropertyConfiguration {
    PropertyConfiguration::from_values([("key-one", "value-one"), ("key-two", "value-two")])
}

fn material_data() -> MaterialData {
    MaterialData::from([("key-one".to_owned(), "value-one".to_owned())])
}

const fn checkpoint_time() -> OffsetDateTime {
    datetime!(2011-07-13 19:43:37.100 UTC)
}

fn checkpoint() -> Revision {
    let data = MaterialData::from([
        ("dataKeyOne".to_owned(), "data-value-one".to_owned()),
        ("dataKeyTwo".to_owned(), "data-value-two".to_owned()),
    ]);
    Revision::new("abc.rpm", checkpoint_time())
        .with_author("someuser")
        .with_comment("comment")
        .with_data(data)
}
