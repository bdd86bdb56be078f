use crate::config::Config;
use crate::schema::Schema;
use crate::types::FieldType;

pub(crate) const SPACEX_SDL: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/spacex.graphql"
));

pub(crate) fn fixture() -> Schema {
    Schema::from_sdl(SPACEX_SDL).unwrap()
}

/// Defaults plus the Hasura scalars the fixture uses. `jsonb` stays unmapped.
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config
        .scalar_map
        .insert("uuid".to_string(), FieldType::String);
    config
        .scalar_map
        .insert("timestamptz".to_string(), FieldType::Datetime);
    config
}
