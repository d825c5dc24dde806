//! Generates options for the schema mirrored by hand in `src/lib.rs`.

use std::{env, error::Error};

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::source_code_info::Location;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MessageOptions, OneofDescriptorProto, SourceCodeInfo,
};

fn field(name: &str, number: i32, ty: Type, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(Into::into),
        ..Default::default()
    }
}

fn scalar(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    field(name, number, ty, None)
}

fn repeated(mut f: FieldDescriptorProto) -> FieldDescriptorProto {
    f.label = Some(Label::Repeated as i32);
    f
}

fn member(mut f: FieldDescriptorProto, oneof: i32) -> FieldDescriptorProto {
    f.oneof_index = Some(oneof);
    f
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.into()),
        field: fields,
        ..Default::default()
    }
}

fn oneof(name: &str) -> OneofDescriptorProto {
    OneofDescriptorProto {
        name: Some(name.into()),
        ..Default::default()
    }
}

fn app() -> FileDescriptorProto {
    let mut age = member(scalar("age", 2, Type::Int32), 0);
    age.proto3_optional = Some(true);

    let metadata_entry = DescriptorProto {
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..message(
            "MetadataEntry",
            vec![scalar("key", 1, Type::String), scalar("value", 2, Type::Int32)],
        )
    };

    let messages = vec![
        DescriptorProto {
            oneof_decl: vec![oneof("_age")],
            ..message("Basic", vec![scalar("name", 1, Type::String), age])
        },
        message("Other", vec![scalar("age", 1, Type::Int32)]),
        DescriptorProto {
            oneof_decl: vec![oneof("choice")],
            ..message(
                "Envelope",
                vec![
                    member(scalar("text", 1, Type::String), 0),
                    member(scalar("count", 2, Type::Int32), 0),
                    member(field("basic", 3, Type::Message, Some(".fixtures.app.Basic")), 0),
                    member(field("status", 4, Type::Enum, Some(".fixtures.app.Status")), 0),
                ],
            )
        },
        DescriptorProto {
            nested_type: vec![
                message("Inner", vec![scalar("depth", 1, Type::Uint64)]),
                metadata_entry,
            ],
            ..message(
                "Outer",
                vec![
                    field("inner", 1, Type::Message, Some(".fixtures.app.Outer.Inner")),
                    field("address", 2, Type::Message, Some(".fixtures.common.Address")),
                    repeated(scalar("tags", 3, Type::String)),
                    repeated(field(
                        "metadata",
                        4,
                        Type::Message,
                        Some(".fixtures.app.Outer.MetadataEntry"),
                    )),
                    field("status", 5, Type::Enum, Some(".fixtures.app.Status")),
                    scalar("payload", 6, Type::Bytes),
                    repeated(field("history", 7, Type::Enum, Some(".fixtures.app.Status"))),
                ],
            )
        },
        message("Quiet", vec![scalar("level", 1, Type::Int32)]),
        message("Bare", vec![scalar("note", 1, Type::String)]),
        message(
            "Host",
            vec![
                field("quiet", 1, Type::Message, Some(".fixtures.app.Quiet")),
                field("bare", 2, Type::Message, Some(".fixtures.app.Bare")),
            ],
        ),
        message(
            "Node",
            vec![
                field("child", 1, Type::Message, Some(".fixtures.app.Node")),
                scalar("label", 2, Type::String),
            ],
        ),
    ];

    let status = EnumDescriptorProto {
        name: Some("Status".into()),
        value: ["STATUS_UNKNOWN", "STATUS_ACTIVE", "STATUS_RETIRED"]
            .iter()
            .zip(0..)
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some((*name).into()),
                number: Some(number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    let comment = |index: i32, text: &str| Location {
        path: vec![4, index],
        leading_comments: Some(text.into()),
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("fixtures/app.proto".into()),
        package: Some("fixtures.app".into()),
        dependency: vec!["fixtures/common.proto".into()],
        syntax: Some("proto3".into()),
        message_type: messages,
        enum_type: vec![status],
        source_code_info: Some(SourceCodeInfo {
            location: vec![
                comment(4, " Applied only through its constructor.\n @optionless\n"),
                comment(5, " @skip_init\n"),
            ],
        }),
        ..Default::default()
    }
}

fn common() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("fixtures/common.proto".into()),
        package: Some("fixtures.common".into()),
        syntax: Some("proto3".into()),
        message_type: vec![message(
            "Address",
            vec![scalar("street", 1, Type::String), scalar("city", 2, Type::String)],
        )],
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");

    let set = FileDescriptorSet {
        file: vec![common(), app()],
    };
    let out_dir = env::var("OUT_DIR")?;
    optgen_build::Config::new().compile(&set, out_dir)?;
    Ok(())
}
