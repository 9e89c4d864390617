/// Declare a record struct that decodes from rows and can be bound as a `SET` parameter.
///
/// Members are looked up by their own name unless a `#[column = "..."]` attribute names the
/// column explicitly. Every member type must implement [`FromField`](crate::decode::FromField)
/// and [`ToQueryParameter`](crate::params::ToQueryParameter).
///
/// ```rust
/// use wirequery::prelude::*;
///
/// wirequery::query_record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct DecimalRow {
///         #[column = "value_double_col"]
///         pub value_double: Numeric,
///         #[column = "value_text_col"]
///         pub value_text: Option<Numeric>,
///     }
/// }
///
/// let row = DecimalRow {
///     value_double: "1.549".parse().unwrap(),
///     value_text: None,
/// };
/// let sql = format_query(
///     "INSERT INTO ?? SET ?",
///     &["t".into(), QueryParameter::set(&row)],
///     &QueryParameterOption::default(),
/// )
/// .unwrap();
/// assert_eq!(sql, "INSERT INTO `t` SET `value_double_col` = 1.549, `value_text_col` = NULL");
/// ```
#[macro_export]
macro_rules! query_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[column = $column:literal])?
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $field_vis $field : $ty, )*
        }

        impl $crate::decode::FromRow for $name {
            #[allow(unused_variables)]
            fn from_row(
                row: &$crate::results::RowResult,
            ) -> ::std::result::Result<Self, $crate::error::QueryError> {
                ::std::result::Result::Ok(Self {
                    $(
                        $field: row.decode::<$ty>(
                            $crate::__record_column!($field $(, $column)?),
                        )?,
                    )*
                })
            }
        }

        impl $crate::params::SetRecord for $name {
            fn set_parameters(
                &self,
            ) -> ::std::vec::Vec<(::std::string::String, $crate::params::QueryParameter)> {
                ::std::vec![
                    $(
                        (
                            ::std::string::String::from(
                                $crate::__record_column!($field $(, $column)?),
                            ),
                            $crate::params::ToQueryParameter::to_query_parameter(&self.$field),
                        ),
                    )*
                ]
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_column {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $column:literal) => {
        $column
    };
}
