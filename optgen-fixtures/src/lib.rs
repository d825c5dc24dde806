//! Message types for `fixtures/app.proto` and `fixtures/common.proto`, laid
//! out the way `prost-build` emits them, with the generated options included
//! next to each package.

pub mod fixtures {
    pub mod app {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Basic {
            #[prost(string, tag = "1")]
            pub name: ::prost::alloc::string::String,
            #[prost(int32, optional, tag = "2")]
            pub age: ::core::option::Option<i32>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Other {
            #[prost(int32, tag = "1")]
            pub age: i32,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Envelope {
            #[prost(oneof = "envelope::Choice", tags = "1, 2, 3, 4")]
            pub choice: ::core::option::Option<envelope::Choice>,
        }

        /// Nested message and enum types in `Envelope`.
        pub mod envelope {
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum Choice {
                #[prost(string, tag = "1")]
                Text(::prost::alloc::string::String),
                #[prost(int32, tag = "2")]
                Count(i32),
                #[prost(message, tag = "3")]
                Basic(super::Basic),
                #[prost(enumeration = "super::Status", tag = "4")]
                Status(i32),
            }
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Outer {
            #[prost(message, optional, tag = "1")]
            pub inner: ::core::option::Option<outer::Inner>,
            #[prost(message, optional, tag = "2")]
            pub address: ::core::option::Option<super::common::Address>,
            #[prost(string, repeated, tag = "3")]
            pub tags: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
            #[prost(map = "string, int32", tag = "4")]
            pub metadata: ::std::collections::HashMap<::prost::alloc::string::String, i32>,
            #[prost(enumeration = "Status", tag = "5")]
            pub status: i32,
            #[prost(bytes = "vec", tag = "6")]
            pub payload: ::prost::alloc::vec::Vec<u8>,
            #[prost(enumeration = "Status", repeated, tag = "7")]
            pub history: ::prost::alloc::vec::Vec<i32>,
        }

        /// Nested message and enum types in `Outer`.
        pub mod outer {
            #[derive(Clone, Copy, PartialEq, ::prost::Message)]
            pub struct Inner {
                #[prost(uint64, tag = "1")]
                pub depth: u64,
            }
        }

        #[derive(Clone, Copy, PartialEq, ::prost::Message)]
        pub struct Quiet {
            #[prost(int32, tag = "1")]
            pub level: i32,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Bare {
            #[prost(string, tag = "1")]
            pub note: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Host {
            #[prost(message, optional, tag = "1")]
            pub quiet: ::core::option::Option<Quiet>,
            #[prost(message, optional, tag = "2")]
            pub bare: ::core::option::Option<Bare>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Node {
            #[prost(message, optional, boxed, tag = "1")]
            pub child: ::core::option::Option<::prost::alloc::boxed::Box<Node>>,
            #[prost(string, tag = "2")]
            pub label: ::prost::alloc::string::String,
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum Status {
            Unknown = 0,
            Active = 1,
            Retired = 2,
        }

        include!(concat!(env!("OUT_DIR"), "/fixtures/app_options.rs"));
    }

    pub mod common {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Address {
            #[prost(string, tag = "1")]
            pub street: ::prost::alloc::string::String,
            #[prost(string, tag = "2")]
            pub city: ::prost::alloc::string::String,
        }

        include!(concat!(env!("OUT_DIR"), "/fixtures/common_options.rs"));
    }
}
