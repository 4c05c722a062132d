#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::shape::{Def, MapDef, Reflect, ReflectMut, Shape};
    use crate::value::Value;

    crate::composite! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct RetryConfig {
            /// Attempts before giving up.
            pub count: u32,
            pub timeout: Duration,
        }
    }

    crate::composite! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct ServiceConfig {
            pub name: String,
            pub port: u16,
            pub debug: bool,
            pub ratio: f64,
            pub tags: Vec<String>,
            pub retry: RetryConfig,
            pub labels: HashMap<String, String>,
            /// Free-form section, shaped by the source data.
            pub extra: Value,
            cache_dir: String,
        }
    }

    impl ServiceConfig {
        pub fn cache_dir(&self) -> &str {
            &self.cache_dir
        }
    }

    // -- Embedding fixtures -----------------------------------------------------

    crate::composite! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Credentials {
            pub user: String,
            pub password: String,
        }
    }

    crate::composite! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Endpoint {
            pub host: String,
            pub port: u16,
            pub credentials: @embed Credentials,
        }
    }

    crate::composite! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct TokenAuth {
            pub user: String,
            pub token: String,
        }
    }

    crate::composite! {
        /// Two embedded members at the same depth both declare `user`.
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Gateway {
            pub name: String,
            pub credentials: @embed Credentials,
            pub auth: @embed TokenAuth,
        }
    }

    crate::composite! {
        /// The direct `count` hides the one promoted from `retry`.
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Shadowed {
            pub count: String,
            pub retry: @embed RetryConfig,
        }
    }

    crate::composite! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Layered {
            pub name: String,
            pub retry: @embed Option<RetryConfig>,
        }
    }

    crate::composite! {
        #[derive(Debug, Default, Clone, PartialEq)]
        #[allow(non_snake_case)]
        pub struct CaseClash {
            pub url: String,
            pub URL: String,
        }
    }

    // -- Container fixtures -----------------------------------------------------

    crate::composite! {
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Limits {
            pub window: [u16; 3],
            pub weights: Vec<f32>,
            pub burst: Option<u64>,
        }
    }

    crate::composite! {
        /// Recursive through an optional box.
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct Chain {
            pub name: String,
            pub next: Option<Box<Chain>>,
        }
    }

    // -- Unsupported destinations -----------------------------------------------

    /// A live resource with no decodable form.
    #[derive(Debug, Default)]
    pub struct Socket;

    impl Reflect for Socket {
        fn shape() -> Shape {
            Shape::of::<Self>(Def::Opaque)
        }

        fn reflect_mut(&mut self) -> ReflectMut<'_> {
            ReflectMut::Opaque
        }
    }

    crate::composite! {
        #[derive(Debug, Default)]
        pub struct WithSocket {
            pub name: String,
            pub socket: Socket,
        }
    }

    /// A mapping keyed by port number.
    #[derive(Debug, Default)]
    pub struct PortMap;

    impl Reflect for PortMap {
        fn shape() -> Shape {
            Shape::of::<Self>(Def::Mapping(MapDef {
                key: u16::shape,
                value: String::shape,
            }))
        }

        fn reflect_mut(&mut self) -> ReflectMut<'_> {
            ReflectMut::Opaque
        }
    }

    crate::composite! {
        #[derive(Debug, Default)]
        pub struct WithPortMap {
            pub ports: PortMap,
        }
    }

    #[test]
    fn fixtures_describe_themselves() {
        let Def::Composite(fields) = ServiceConfig::shape().def else {
            panic!("expected a composite shape");
        };
        assert_eq!(fields.len(), 9);
        assert!(ServiceConfig::default().cache_dir().is_empty());
        assert!(matches!(Socket::shape().def, Def::Opaque));
    }
}
