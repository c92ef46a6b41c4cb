//! End-to-end compilation tests: schema source in, generated C++ text out.
//! Assertions pin the emitted class layout, member naming, wire-call shape
//! and the type identifier sequence.

use netidl::ast::{Kind, NodeKind, Tree};
use netidl::generate::{GenError, Generator, Stage, TYPE_ID_MIN};
use netidl::{compile, dump_tree, parse};

#[test]
fn compile_minimal_message() {
    let out = compile("message foo { int32 x; };").expect("compile");
    assert!(out.starts_with("namespace net {\n"), "{}", out);
    assert!(out.ends_with("};\n"), "{}", out);
    assert!(out.contains("\tclass pak_foo : packet {\n"), "{}", out);
    assert!(out.contains("\t\t\tint32 __x;\n"), "{}", out);
    assert!(
        out.contains("\t\t\tstatic const uint16 type_id = 0x0100;\n"),
        "{}",
        out
    );
    assert!(
        out.contains("\t\t\tsize_t serialize( char *data, int max_len ) const {\n"),
        "{}",
        out
    );
    assert!(
        out.contains("\t\t\t\t::net::encoding::write( vars.__x, data, pos, max_len );\n"),
        "{}",
        out
    );
    assert!(
        out.contains("\t\t\t\t::net::encoding::read( vars.__x, data, pos, max_len );\n"),
        "{}",
        out
    );
    assert!(out.contains("\t\t\t\treturn pos;\n"), "{}", out);
}

#[test]
fn compile_accessors() {
    let out = compile("message foo { int32 x; };").expect("compile");
    assert!(
        out.contains("int32 get_x( ) const { return __x; }"),
        "{}",
        out
    );
    assert!(
        out.contains("void set_x( int32 val ) { __x = val; }"),
        "{}",
        out
    );
}

#[test]
fn compile_array_field() {
    let out = compile("message pkt { uint8 buf[16]; };").expect("compile");
    assert!(out.contains("uint8 __buf[16];"), "{}", out);
    assert!(
        out.contains("::net::encoding::write_arr( vars.__buf, 16, data, pos, max_len );"),
        "{}",
        out
    );
    assert!(
        out.contains("::net::encoding::read_arr( vars.__buf, 16, data, pos, max_len );"),
        "{}",
        out
    );
    assert!(
        out.contains("uint8 get_buf( int idx ) const { return __buf[idx]; }"),
        "{}",
        out
    );
    assert!(
        out.contains("void set_buf( int idx, uint8 val ) { __buf[idx] = val; }"),
        "{}",
        out
    );
}

#[test]
fn compile_namespace_and_typedef_and_enum() {
    let src = "namespace game {\n@type uint16 seq_t;\nenum colors { red, green, blue };\nmessage m { seq_t s; };\n};";
    let out = compile(src).expect("compile");
    assert!(out.contains("\tnamespace game {\n"), "{}", out);
    assert!(out.contains("\t\ttypedef uint16 seq_t;\n"), "{}", out);
    assert!(out.contains("\t\tenum colors {\n"), "{}", out);
    assert!(out.contains("\t\t\tred,\n"), "{}", out);
    assert!(out.contains("\t\t\tgreen,\n"), "{}", out);
    // No comma after the last constant.
    assert!(out.contains("\t\t\tblue\n"), "{}", out);
}

#[test]
fn compile_empty_enum() {
    let out = compile("enum nothing { };").expect("compile");
    assert!(out.contains("\tenum nothing {\n\t};\n"), "{}", out);
}

#[test]
fn inherited_fields_precede_direct_fields() {
    let src = "base hdr { uint16 seq; };\nmessage move : hdr { int32 x; };";
    let out = compile(src).expect("compile");
    // The base never emits a class of its own.
    assert!(!out.contains("pak_hdr"), "{}", out);
    let seq_member = out.find("uint16 __seq;").expect("inherited member");
    let x_member = out.find("int32 __x;").expect("direct member");
    assert!(seq_member < x_member, "{}", out);
    let seq_write = out
        .find("write( vars.__seq, data, pos, max_len );")
        .expect("inherited write");
    let x_write = out
        .find("write( vars.__x, data, pos, max_len );")
        .expect("direct write");
    assert!(seq_write < x_write, "{}", out);
}

#[test]
fn bases_composite_in_declaration_order() {
    let src = "base a { uint8 fa; };\nbase b { uint8 fb; };\nmessage m : a, b { uint8 fm; };";
    let out = compile(src).expect("compile");
    let fa = out.find("uint8 __fa;").expect("a member");
    let fb = out.find("uint8 __fb;").expect("b member");
    let fm = out.find("uint8 __fm;").expect("direct member");
    assert!(fa < fb && fb < fm, "{}", out);
}

#[test]
fn transitive_bases_flatten_depth_first() {
    let src = "base a { uint8 fa; };\nbase b : a { uint8 fb; };\nmessage m : b { uint8 fm; };";
    let out = compile(src).expect("compile");
    let fa = out.find("uint8 __fa;").expect("a member");
    let fb = out.find("uint8 __fb;").expect("b member");
    let fm = out.find("uint8 __fm;").expect("direct member");
    assert!(fa < fb && fb < fm, "{}", out);
}

#[test]
fn type_ids_increase_in_document_order() {
    let src = "message a { };\nnamespace n {\nmessage b { };\n};\nmessage c { };";
    let out = compile(src).expect("compile");
    let a = out.find("type_id = 0x0100;").expect("first id");
    let b = out.find("type_id = 0x0101;").expect("second id");
    let c = out.find("type_id = 0x0102;").expect("third id");
    assert!(a < b && b < c, "{}", out);
}

#[test]
fn compile_is_deterministic() {
    let src = "base hdr { uint16 seq; };\nmessage a : hdr { int32 x; };\nmessage b : hdr { int32 y; };";
    let first = compile(src).expect("compile");
    let second = compile(src).expect("compile");
    assert_eq!(first, second);
}

#[test]
fn compile_list() {
    let src = "message pkt {\nlist entries {\nuint32 id;\n};\n};";
    let out = compile(src).expect("compile");
    assert!(out.contains("class entries {"), "{}", out);
    assert!(out.contains("friend class pak_pkt;"), "{}", out);
    assert!(out.contains("std::vector<entries> _ventries;"), "{}", out);
    assert!(
        out.contains("for( auto i = vars._ventries.begin(); i != vars._ventries.end(); ++i ) {"),
        "{}",
        out
    );
    assert!(out.contains("const entries& vars = *i;"), "{}", out);
    assert!(out.contains("entries& vars = *i;"), "{}", out);
    assert!(
        out.contains("::net::encoding::write( vars.__id, data, pos, max_len );"),
        "{}",
        out
    );
}

#[test]
fn compile_nested_lists_use_qualified_element_type() {
    let src = "message pkt {\nlist outer {\nlist inner {\nint8 v;\n};\n};\n};";
    let out = compile(src).expect("compile");
    // The inner element class nests inside the outer one, so the serializer
    // alias needs the qualified name.
    assert!(out.contains("std::vector<inner> _vinner;"), "{}", out);
    assert!(out.contains("const outer::inner& vars = *i;"), "{}", out);
    assert!(out.contains("outer::inner& vars = *i;"), "{}", out);
    let outer_loop = out.find("vars._vouter.begin()").expect("outer loop");
    let inner_loop = out.find("vars._vinner.begin()").expect("inner loop");
    assert!(outer_loop < inner_loop, "{}", out);
}

#[test]
fn list_composites_its_inherited_base() {
    let src = "base row { uint16 id; };\nmessage pkt {\nlist rows : row {\nuint8 flag;\n};\n};";
    let out = compile(src).expect("compile");
    let id_member = out.find("uint16 __id;").expect("inherited member");
    let flag_member = out.find("uint8 __flag;").expect("direct member");
    assert!(id_member < flag_member, "{}", out);
    assert!(
        out.contains("::net::encoding::write( vars.__id, data, pos, max_len );"),
        "{}",
        out
    );
}

#[test]
fn type_id_space_exhaustion() {
    // 0x0100..=0x03fe is 767 allocatable ids; the 768th message fails.
    let mut src = String::new();
    for i in 0..767 {
        src.push_str(&format!("message m{} {{ }};\n", i));
    }
    let out = compile(&src).expect("last id still fits");
    assert!(out.contains("type_id = 0x03fe;"), "last allocated id");
    assert!(!out.contains("type_id = 0x03ff;"));

    src.push_str("message overflow { };\n");
    let err = compile(&src).expect_err("id space exhausted");
    assert!(
        err.to_string().contains("too many packets"),
        "{}",
        err
    );
}

#[test]
fn generator_reports_missing_base_on_unvalidated_tree() {
    // Driving the generator without the resolver: the inherit name does not
    // resolve and generation fails instead of emitting partial output.
    let mut tree = Tree::new();
    let root = tree.root();
    let msg = tree.alloc(
        1,
        root,
        NodeKind::Message {
            name: "m".to_string(),
            inherits: vec!["ghost".to_string()],
            children: Vec::new(),
        },
    );
    tree.attach(root, msg);

    let mut out = String::new();
    let err = Generator::new(&tree, &mut out)
        .generate()
        .expect_err("unresolvable base");
    match err {
        GenError::MissingBase { name, .. } => assert_eq!(name, "ghost"),
        other => panic!("expected MissingBase, got {:?}", other),
    }
}

#[test]
fn generator_rejects_misplaced_node_with_wrong_stage() {
    // An enum only emits at top level; smuggled inside a message on an
    // unvalidated tree, the member walk must fail instead of emitting it.
    let mut tree = Tree::new();
    let root = tree.root();
    let msg = tree.alloc(
        1,
        root,
        NodeKind::Message {
            name: "m".to_string(),
            inherits: Vec::new(),
            children: Vec::new(),
        },
    );
    tree.attach(root, msg);
    let misplaced = tree.alloc(
        2,
        msg,
        NodeKind::Enum {
            name: "bad".to_string(),
            values: Vec::new(),
        },
    );
    tree.attach(msg, misplaced);

    let mut out = String::new();
    let err = Generator::new(&tree, &mut out)
        .generate()
        .expect_err("enum inside a message body");
    match err {
        GenError::WrongStage { kind, stage, line, .. } => {
            assert_eq!(kind, Kind::Enum);
            assert_eq!(stage, Stage::Members);
            assert_eq!(line, 2);
        }
        other => panic!("expected WrongStage, got {:?}", other),
    }
    assert!(!out.contains("enum bad"), "{}", out);
}

#[test]
fn attach_under_leaf_node_is_ignored() {
    let mut tree = Tree::new();
    let root = tree.root();
    let td = tree.alloc(
        1,
        root,
        NodeKind::Typedef {
            name: "seq_t".to_string(),
            ty: "uint16".to_string(),
        },
    );
    tree.attach(root, td);
    let stray = tree.alloc(
        2,
        td,
        NodeKind::Var {
            name: "x".to_string(),
            ty: "uint8".to_string(),
            arr_len: None,
        },
    );
    tree.attach(td, stray);
    assert!(tree.node(td).children().is_empty());
    assert_eq!(tree.node(root).children().len(), 1);
}

#[test]
fn generator_type_id_counter_starts_at_min() {
    let out = compile("message first { };").expect("compile");
    assert!(
        out.contains(&format!("type_id = 0x{:04x};", TYPE_ID_MIN)),
        "{}",
        out
    );
}

#[test]
fn dump_tree_shows_structure() {
    let tree = parse("base hdr { uint8 h; };\nmessage m : hdr { int32 x; };").expect("parse");
    let text = dump_tree(&tree);
    assert!(text.contains("[root"), "{}", text);
    assert!(text.contains("[base"), "{}", text);
    assert!(text.contains("[message"), "{}", text);
    assert!(text.contains("name: 'hdr'"), "{}", text);
    assert!(text.contains("'hdr'"), "{}", text);
    assert!(text.contains("type: 'int32'"), "{}", text);
}
