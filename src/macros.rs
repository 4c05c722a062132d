/// Declare a struct and register it as a composite destination.
///
/// The struct is emitted unchanged, together with [`Reflect`](crate::Reflect)
/// and [`CompositeMut`](crate::CompositeMut) implementations listing its
/// fields in declaration order. Fields without a visibility modifier are
/// private and never decoded. A field whose type is prefixed with `@embed` is
/// embedded: its own fields are promoted into the enclosing composite, the
/// same way as if they were declared there.
///
/// ```
/// cfgshape::composite! {
///     #[derive(Debug, Default)]
///     pub struct Retry {
///         pub count: u32,
///         pub timeout: std::time::Duration,
///     }
/// }
///
/// cfgshape::composite! {
///     #[derive(Debug, Default)]
///     pub struct Service {
///         pub name: String,
///         pub retry: @embed Retry,
///         cache_dir: String,
///     }
/// }
///
/// fn main() -> Result<(), cfgshape::DecodeError> {
///     let mut service = Service::default();
///     let source = "name = \"api\"\ncount = 4\ncache_dir = \"/tmp\"\n";
///     cfgshape::decode(source.as_bytes(), "toml", &mut service)?;
///     assert_eq!(service.name, "api");
///     // promoted from the embedded `retry` member
///     assert_eq!(service.retry.count, 4);
///     // private, so left alone
///     assert!(service.cache_dir.is_empty());
///     Ok(())
/// }
/// ```
///
/// Generic structs are not supported; implement the traits by hand.
#[macro_export]
macro_rules! composite {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $(@$marker:ident)? $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Reflect for $name {
            fn shape() -> $crate::Shape {
                const FIELDS: &[$crate::Field] = &[
                    $(
                        $crate::Field::new(
                            stringify!($field),
                            <$ty as $crate::Reflect>::shape,
                        )
                        .exported(!stringify!($field_vis).is_empty())
                        $(.$marker())?,
                    )*
                ];
                $crate::Shape::of::<Self>($crate::Def::Composite(FIELDS))
            }

            fn reflect_mut(&mut self) -> $crate::ReflectMut<'_> {
                $crate::ReflectMut::Composite(self)
            }
        }

        impl $crate::CompositeMut for $name {
            fn type_shape(&self) -> $crate::Shape {
                <Self as $crate::Reflect>::shape()
            }

            #[allow(unused_variables)]
            fn field_mut(&mut self, name: &str) -> ::core::option::Option<&mut dyn $crate::Reflect> {
                $(
                    if name == stringify!($field) {
                        return ::core::option::Option::Some(&mut self.$field);
                    }
                )*
                ::core::option::Option::None
            }
        }
    };
}
