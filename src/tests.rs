use crate::collision::CollisionMap;
use crate::decl::*;
use crate::naming::{NameResolver, Qualified};
use crate::schema::*;
use crate::strategy::Strategy;
use crate::{generate, Config};

fn pkg() -> Package {
    Package::new("acme.app")
}

fn message(name: &str) -> Message {
    Message::new(TypeRef::new(pkg(), name))
}

fn msg_kind(name: &str) -> Kind {
    Kind::Message(TypeRef::new(pkg(), name))
}

fn generate_one(files: Vec<File>) -> Vec<FileDeclarations> {
    generate(&SchemaSet::new(files), &Config::new().trace(true))
}

fn names(decls: &FileDeclarations) -> Vec<&str> {
    decls.declarations.iter().map(|d| d.name().as_str()).collect()
}

fn setter<'a>(decls: &'a FileDeclarations, name: &str) -> &'a Setter {
    match decls.get(name) {
        Some(Declaration::Setter(s)) => s,
        other => panic!("expected setter `{}`, found {:?}", name, other),
    }
}

fn basic_and_other() -> File {
    File::new("acme/app.proto", pkg())
        .message(
            message("Basic")
                .field(Field::new("name", Kind::String))
                .field(Field::new("age", Kind::Int32)),
        )
        .message(message("Other").field(Field::new("age", Kind::Int32)))
}

#[test]
fn unique_and_shared_field_names() {
    let out = generate_one(vec![basic_and_other()]);
    assert_eq!(
        names(&out[0]),
        [
            "NewBasic",
            "ApplyBasicOptions",
            "BasicOption",
            "WithName",
            "WithAgeForBasic",
            "NewOther",
            "ApplyOtherOptions",
            "OtherOption",
            "WithAgeForOther",
        ]
    );
    let age = setter(&out[0], "WithAgeForBasic");
    assert_eq!(age.field, "age");
    assert_eq!(age.option_type, "BasicOption");
    assert_eq!(age.param, Param::Value(ValueType::Int32));
    assert_eq!(age.assign, Assign::Value);
}

#[test]
fn snake_case_spelling() {
    let out = generate_one(vec![basic_and_other()]);
    assert_eq!(out[0].declarations[4].name().to_snake_case(), "with_age_for_basic");
    assert_eq!(out[0].declarations[1].name().to_snake_case(), "apply_basic_options");
}

#[test]
fn naming_is_idempotent() {
    let file = basic_and_other();
    let collisions = CollisionMap::analyze(&file.messages);
    let names = NameResolver::new(&collisions);
    let basic = &file.messages[0];
    for field in &basic.fields {
        assert_eq!(names.setter(basic, field), names.setter(basic, field));
        assert_eq!(
            names.nested_constructor(basic, field),
            names.nested_constructor(basic, field)
        );
    }
}

#[test]
fn suffix_exactly_when_ambiguous() {
    let file = File::new("acme/app.proto", pkg())
        .message(
            message("Alpha")
                .field(Field::new("id", Kind::Uint64))
                .field(Field::new("label", Kind::String))
                .field(Field::new("child", msg_kind("Beta"))),
        )
        .message(
            message("Beta")
                .field(Field::new("id", Kind::Uint64))
                .field(Field::new("weight", Kind::Float64)),
        )
        .message(message("Gamma").field(Field::new("child", msg_kind("Beta"))));
    let collisions = CollisionMap::analyze(&file.messages);
    let out = generate_one(vec![file]);

    for s in out[0].setters() {
        let owner = s.message.flat_name();
        let suffixed = s.name.as_str().ends_with(&format!("For{}", owner));
        assert_eq!(
            suffixed,
            collisions.is_ambiguous(&s.field),
            "{} for field {}",
            s.name,
            s.field
        );
    }
    assert!(out[0].get("WithNewChildForAlpha").is_some());
    assert!(out[0].get("WithNewChildForGamma").is_some());
    assert!(out[0].get("WithWeight").is_some());
}

#[test]
fn collisions_count_messages_not_type_names() {
    let file = File::new("acme/app.proto", pkg())
        .message(message("Age").field(Field::new("value", Kind::Int32)))
        .message(message("Person").field(Field::new("age", Kind::Int32)));
    let collisions = CollisionMap::analyze(&file.messages);
    assert!(!collisions.is_ambiguous("age"));
    assert_eq!(collisions.count("age"), 1);
    assert_eq!(collisions.count("missing"), 0);
}

#[test]
fn collisions_compare_canonical_names() {
    let file = File::new("acme/app.proto", pkg())
        .message(message("A").field(Field::new("first_name", Kind::String)))
        .message(message("B").field(Field::new("firstName", Kind::String)));
    let collisions = CollisionMap::analyze(&file.messages);
    assert!(collisions.is_ambiguous("first_name"));
    assert_eq!(collisions.ambiguous_names(), ["FirstName"]);
}

#[test]
fn collisions_span_files() {
    let other = File::new("acme/other.proto", pkg())
        .message(message("Remote").field(Field::new("name", Kind::String)));
    let out = generate_one(vec![basic_and_other(), other]);
    assert_eq!(out.len(), 2);
    assert!(out[0].get("WithNameForBasic").is_some());
    assert!(out[1].get("WithNameForRemote").is_some());
}

#[test]
fn dependency_files_are_not_generated_or_counted() {
    let dep = File::new("acme/dep.proto", pkg())
        .message(message("Dep").field(Field::new("name", Kind::String)))
        .dependency();
    let out = generate_one(vec![dep, basic_and_other()]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].file, "acme/app.proto");
    assert!(out[0].get("WithName").is_some());
}

#[test]
fn oneof_members_only_get_variant_setters() {
    let file = File::new("acme/app.proto", pkg()).message(message("Envelope").oneof(
        "choice",
        vec![Field::new("text", Kind::String), Field::new("count", Kind::Int32)],
    ));
    let out = generate_one(vec![file]);
    assert_eq!(
        names(&out[0]),
        ["NewEnvelope", "ApplyEnvelopeOptions", "EnvelopeOption", "WithText", "WithCount"]
    );
    for name in ["WithText", "WithCount"] {
        let s = setter(&out[0], name);
        assert_eq!(
            s.target,
            Target::Variant {
                oneof: "choice".into()
            }
        );
        assert_eq!(s.assign, Assign::Value);
    }
}

#[test]
fn oneof_message_member_gets_variant_constructor() {
    let file = File::new("acme/app.proto", pkg())
        .message(message("Inner").field(Field::new("x", Kind::Int32)))
        .message(message("Holder").oneof(
            "payload",
            vec![
                Field::new("inner", msg_kind("Inner")),
                Field::new("code", Kind::Enum(TypeRef::new(pkg(), "Code"))),
            ],
        ));
    let out = generate_one(vec![file]);
    let direct = setter(&out[0], "WithInner");
    assert_eq!(direct.assign, Assign::Reference);
    let built = setter(&out[0], "WithNewInner");
    assert_eq!(
        built.target,
        Target::Variant {
            oneof: "payload".into()
        }
    );
    assert!(matches!(
        &built.assign,
        Assign::Construct(Construction::Constructor { name, .. }) if name == "NewInner"
    ));
    assert_eq!(setter(&out[0], "WithCode").assign, Assign::Enum);
}

#[test]
fn nested_message_gets_direct_and_convenience_setters() {
    let file = File::new("acme/app.proto", pkg())
        .message(message("Inner").field(Field::new("depth", Kind::Uint32)))
        .message(message("Outer").field(Field::new("inner", msg_kind("Inner"))));
    let out = generate_one(vec![file]);
    let tail: Vec<_> = names(&out[0]).into_iter().skip(7).collect();
    assert_eq!(tail, ["WithInner", "WithNewInner"]);

    let built = setter(&out[0], "WithNewInner");
    let inner = Qualified {
        ty: TypeRef::new(pkg(), "Inner"),
        qualifier: None,
    };
    assert_eq!(
        built.param,
        Param::Options {
            option_type: NameResolver::option_type(&inner.ty),
            message: inner.clone(),
        }
    );
    assert_eq!(
        built.assign,
        Assign::Construct(Construction::Constructor {
            name: NameResolver::constructor(&inner.ty),
            message: inner,
        })
    );
}

#[test]
fn nested_convenience_follows_collision_rule() {
    let file = File::new("acme/app.proto", pkg())
        .message(message("Inner"))
        .message(message("Outer").field(Field::new("inner", msg_kind("Inner"))))
        .message(message("Shell").field(Field::new("inner", msg_kind("Inner"))));
    let out = generate_one(vec![file]);
    assert!(out[0].get("WithInnerForOuter").is_some());
    assert!(out[0].get("WithNewInnerForOuter").is_some());
    assert!(out[0].get("WithNewInnerForShell").is_some());
    assert!(out[0].get("WithNewInner").is_none());
}

#[test]
fn flags_suppress_their_declarations() {
    let file = File::new("acme/app.proto", pkg())
        .message(
            message("Quiet")
                .field(Field::new("level", Kind::Int32))
                .flags(Flags {
                    optionless: true,
                    skip_init: false,
                }),
        )
        .message(message("Bare").flags(Flags {
            optionless: false,
            skip_init: true,
        }))
        .message(
            message("Host")
                .field(Field::new("quiet", msg_kind("Quiet")))
                .field(Field::new("bare", msg_kind("Bare"))),
        );
    let out = generate_one(vec![file]);
    assert!(out[0].get("NewQuiet").is_some());
    assert!(out[0].get("ApplyQuietOptions").is_none());
    assert!(out[0].get("QuietOption").is_some());
    assert!(out[0].get("NewBare").is_none());
    assert!(out[0].get("ApplyBareOptions").is_some());

    let quiet = setter(&out[0], "WithNewQuiet");
    assert_eq!(quiet.param, Param::None);
    assert!(matches!(
        quiet.assign,
        Assign::Construct(Construction::Constructor { .. })
    ));

    let bare = setter(&out[0], "WithNewBare");
    assert!(matches!(bare.param, Param::Options { .. }));
    assert!(matches!(
        bare.assign,
        Assign::Construct(Construction::Zero { .. })
    ));
}

#[test]
fn foreign_messages_without_options_only_get_direct_setter() {
    let wkt = Package::new("google.protobuf");
    let stamp = TypeRef::new(wkt.clone(), "Timestamp");
    let dep = File::new("google/protobuf/timestamp.proto", wkt)
        .message(Message::new(stamp.clone()).field(Field::new("seconds", Kind::Int64)))
        .dependency();
    let file = File::new("acme/app.proto", pkg())
        .message(message("Event").field(Field::new("at", Kind::Message(stamp))));
    let out = generate_one(vec![dep, file]);
    assert!(out[0].get("WithAt").is_some());
    assert!(out[0].get("WithNewAt").is_none());
}

#[test]
fn cross_package_references_are_qualified() {
    let common = Package::new("acme.common");
    let address = TypeRef::new(common.clone(), "Address");
    let status = TypeRef::new(common.clone(), "Status");
    let lib = File::new("acme/common.proto", common.clone())
        .message(Message::new(address.clone()).field(Field::new("street", Kind::String)));
    let app = File::new("acme/app.proto", pkg()).message(
        message("Customer")
            .field(Field::new("home", Kind::Message(address.clone())))
            .field(Field::new("status", Kind::Enum(status)))
            .field(Field::new("friend", msg_kind("Customer"))),
    );
    let out = generate_one(vec![lib, app]);

    let home = setter(&out[1], "WithHome");
    match &home.param {
        Param::Value(ValueType::Message(q)) => assert_eq!(q.qualifier.as_deref(), Some("common")),
        other => panic!("unexpected param {:?}", other),
    }
    let built = setter(&out[1], "WithNewHome");
    match &built.param {
        Param::Options { message, .. } => {
            assert_eq!(message.to_string(), "common.Address");
        }
        other => panic!("unexpected param {:?}", other),
    }
    match &setter(&out[1], "WithStatus").param {
        Param::Value(ValueType::Enum(q)) => assert!(q.is_foreign()),
        other => panic!("unexpected param {:?}", other),
    }
    match &setter(&out[1], "WithFriend").param {
        Param::Value(ValueType::Message(q)) => assert_eq!(q.qualifier, None),
        other => panic!("unexpected param {:?}", other),
    }

    let refs: Vec<_> = out[1].references().into_iter().collect();
    assert_eq!(refs, [&common]);
    assert!(out[0].references().is_empty());
}

#[test]
fn qualification_compares_keys_only() {
    let a = Package::with_name("acme.v1", "v1");
    let b = Package::with_name("other.v1", "v1");
    let ty = TypeRef::new(b, "Thing");
    assert_eq!(NameResolver::qualify(&a, &ty).qualifier.as_deref(), Some("v1"));
    assert_eq!(NameResolver::qualify(&ty.package, &ty).qualifier, None);
}

#[test]
fn synthetic_oneofs_are_transparent() {
    let file = File::new("acme/app.proto", pkg()).message(
        message("Maybe")
            .synthetic_oneof("_score", Field::new("score", Kind::Float32))
            .synthetic_oneof("_tag", Field::new("tag", Kind::Bytes)),
    );
    let msg = &file.messages[0];
    assert_eq!(Strategy::classify(msg, &msg.fields[0]), Strategy::Scalar);

    let out = generate_one(vec![file]);
    let score = setter(&out[0], "WithScore");
    assert_eq!(score.target, Target::Field);
    assert_eq!(score.assign, Assign::Optional);
    // bytes are not part of the optional convention
    assert_eq!(setter(&out[0], "WithTag").assign, Assign::Value);
}

#[test]
fn classifier_order() {
    let status = Kind::Enum(TypeRef::new(pkg(), "Status"));
    let msg = message("Everything")
        .field(Field::new("flag", Kind::Bool))
        .field(Field::new("status", status.clone()))
        .field(Field::new("child", msg_kind("Child")))
        .field(Field::new("tags", Kind::String).repeated())
        .field(Field::new("children", msg_kind("Child")).repeated())
        .field(Field::map("labels", Kind::String, msg_kind("Child")))
        .oneof("pick", vec![Field::new("other", msg_kind("Child"))]);

    let got: Vec<_> = msg
        .fields
        .iter()
        .map(|f| Strategy::classify(&msg, f))
        .collect();
    assert_eq!(
        got,
        [
            Strategy::Scalar,
            Strategy::Enum,
            Strategy::Message,
            Strategy::Repeated,
            Strategy::Repeated,
            Strategy::Map,
            Strategy::OneofMember,
        ]
    );
}

#[test]
fn collection_setters() {
    let file = File::new("acme/app.proto", pkg()).message(
        message("Bag")
            .field(Field::new("tags", Kind::String).repeated())
            .field(Field::map("counts", Kind::String, Kind::Int32))
            .field(Field::new("nested", msg_kind("Bag")).repeated()),
    );
    let out = generate_one(vec![file]);
    assert_eq!(
        setter(&out[0], "WithTags").param,
        Param::Variadic(ValueType::String)
    );
    assert_eq!(
        setter(&out[0], "WithCounts").param,
        Param::Map {
            key: ValueType::String,
            value: ValueType::Int32
        }
    );
    // repeated messages are plain lists, with no convenience constructor
    assert!(out[0].get("WithNewNested").is_none());
}

#[test]
fn nullable_scalars_and_enums() {
    let status = Kind::Enum(TypeRef::new(pkg(), "Status"));
    let file = File::new("acme/app.proto", pkg()).message(
        message("Legacy")
            .field(Field::new("name", Kind::String).nullable())
            .field(Field::new("active", Kind::Bool).nullable())
            .field(Field::new("status", status).nullable())
            .field(Field::new("plain", Kind::Uint64)),
    );
    let out = generate_one(vec![file]);
    assert_eq!(setter(&out[0], "WithName").assign, Assign::Optional);
    assert_eq!(setter(&out[0], "WithActive").assign, Assign::Optional);
    let status = setter(&out[0], "WithStatus");
    assert_eq!(status.assign, Assign::Enum);
    assert!(status.nullable);
    assert_eq!(setter(&out[0], "WithPlain").assign, Assign::Value);
}

#[test]
fn unknown_kinds_degrade_to_opaque() {
    let file = File::new("acme/app.proto", pkg()).message(
        message("Future")
            .field(Field::new("mystery", Kind::Opaque))
            .field(Field::new("known", Kind::Int32)),
    );
    let out = generate_one(vec![file]);
    let mystery = setter(&out[0], "WithMystery");
    assert_eq!(mystery.param, Param::Value(ValueType::Opaque));
    assert!(mystery.is_opaque());
    assert!(out[0].get("WithKnown").is_some());
}

#[test]
fn nested_types_use_flat_names() {
    let inner = TypeRef::nested(pkg(), vec!["Outer".into()], "Inner");
    let file = File::new("acme/app.proto", pkg())
        .message(message("Outer").field(Field::new("inner", Kind::Message(inner.clone()))))
        .message(Message::new(inner).field(Field::new("value", Kind::Int32)));
    let out = generate_one(vec![file]);
    assert!(out[0].get("NewOuterInner").is_some());
    assert!(out[0].get("OuterInnerOption").is_some());
    assert_eq!(setter(&out[0], "WithValue").option_type, "OuterInnerOption");
    match &setter(&out[0], "WithNewInner").assign {
        Assign::Construct(Construction::Constructor { name, .. }) => {
            assert_eq!(name, "NewOuterInner")
        }
        other => panic!("unexpected assign {:?}", other),
    }
}

#[test]
fn files_keep_input_order() {
    let files: Vec<_> = ["c.proto", "a.proto", "b.proto"]
        .iter()
        .map(|name| File::new(*name, pkg()))
        .collect();
    let out = generate_one(files);
    let got: Vec<_> = out.iter().map(|f| f.file.as_str()).collect();
    assert_eq!(got, ["c.proto", "a.proto", "b.proto"]);
}

fn assert_unique(decls: &FileDeclarations) {
    let mut seen = std::collections::HashSet::new();
    for name in names(decls) {
        assert!(seen.insert(name), "`{}` declared twice in {:?}", name, names(decls));
    }
}

#[test]
fn in_place_setter_never_shadows_a_direct_setter() {
    let outer = || {
        message("Outer")
            .field(Field::new("inner", msg_kind("Inner")))
            .field(Field::new("new_inner", Kind::Int32))
    };
    let file = File::new("acme/app.proto", pkg())
        .message(message("Inner").field(Field::new("x", Kind::Int32)))
        .message(outer());
    let out = generate_one(vec![file]);
    assert_unique(&out[0]);
    assert_eq!(setter(&out[0], "WithNewInner").field, "new_inner");
    assert_eq!(setter(&out[0], "WithNewInner").param, Param::Value(ValueType::Int32));

    // the owner suffix does not separate them either
    let shell = message("Shell")
        .field(Field::new("inner", msg_kind("Inner")))
        .field(Field::new("new_inner", Kind::Int32));
    let file = File::new("acme/app.proto", pkg())
        .message(message("Inner"))
        .message(outer())
        .message(shell);
    let out = generate_one(vec![file]);
    assert_unique(&out[0]);
    assert_eq!(setter(&out[0], "WithNewInnerForOuter").field, "new_inner");
    assert_eq!(setter(&out[0], "WithNewInnerForShell").field, "new_inner");
}

#[test]
fn root_package_types_are_never_qualified() {
    let root = Package::new("");
    assert_eq!(root.name, "");
    let ty = TypeRef::new(root, "Loose");
    let q = NameResolver::qualify(&pkg(), &ty);
    assert_eq!(q.qualifier, None);
    assert_eq!(q.to_string(), "Loose");

    let file = File::new("acme/app.proto", pkg())
        .message(message("Holder").field(Field::new("loose", Kind::Message(ty))));
    let out = generate_one(vec![file]);
    assert!(out[0].references().is_empty());
}
