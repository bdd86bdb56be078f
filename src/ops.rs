pub const INTROSPECTION: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/graphql/Introspection.graphql"
));

pub const INTROSPECTION_OPERATION: &str = "IntrospectionQuery";
