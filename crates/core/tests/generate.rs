//! End-to-end generation tests against the public API only.

#![allow(clippy::unwrap_used)]

use declgen_core::{
    FsSink, GenerateConfig, GenerateOptions, Generator, MemorySink, TypeRegistry,
    SINGLE_FILE_NAME,
};

/// A small but representative model set: enums, nullable members, nested
/// composites, collections, maps, and an awaitable-wrapped root.
fn demo_registry() -> (TypeRegistry, declgen_core::TypeRef) {
    let mut r = TypeRegistry::new();
    let (string, int, guid, date) = (r.string(), r.int(), r.uuid(), r.date_time());

    let status = r.define_enum_in(
        "Demo.Models",
        "OrderStatus",
        &[("Pending", 0), ("Shipped", 1), ("Delivered", 2)],
    );
    let nullable_int = r.nullable_of(int);
    let line = r.define_struct_in(
        "Demo.Models",
        "OrderLine",
        &[("Product", string), ("Quantity", int), ("Discount", nullable_int)],
    );
    let lines = r.sequence_of(line);
    let tags = r.map_of(string, string);
    let order = r.define_struct_in(
        "Demo.Models",
        "Order",
        &[
            ("Id", guid),
            ("Status", status),
            ("Lines", lines),
            ("Tags", tags),
            ("Placed", date),
        ],
    );
    let wrapped = r.wrapper_of(order);
    (r, wrapped)
}

#[test]
fn single_file_output_contains_every_reachable_declaration() {
    let (r, root) = demo_registry();
    let config = GenerateConfig::builder().build().unwrap();
    let mut generator = Generator::new(&r, config);
    let mut sink = MemorySink::new();
    generator.run(&[root], &mut sink).unwrap();

    let contents = sink.stream(SINGLE_FILE_NAME).unwrap();
    assert_eq!(
        contents,
        "export interface Order {\n\
         \x20   id: string;\n\
         \x20   status: OrderStatus;\n\
         \x20   lines: OrderLine[];\n\
         \x20   tags: Map<string, string>;\n\
         \x20   placed: any;\n\
         }\n\
         export const enum OrderStatus {\n\
         \x20   Pending = 0,\n\
         \x20   Shipped = 1,\n\
         \x20   Delivered = 2\n\
         }\n\
         export interface OrderLine {\n\
         \x20   product: string;\n\
         \x20   quantity: number;\n\
         \x20   discount?: number;\n\
         }\n"
    );
}

#[test]
fn per_type_output_writes_one_file_per_declaration_with_imports() {
    let (r, root) = demo_registry();
    let config = GenerateConfig::builder().single_file(false).build().unwrap();
    let mut generator = Generator::new(&r, config);

    let dir = tempfile::tempdir().unwrap();
    let mut sink = FsSink::new(dir.path());
    generator.run(&[root], &mut sink).unwrap();

    let order = std::fs::read_to_string(dir.path().join("Order.d.ts")).unwrap();
    assert!(order.starts_with(
        "import { OrderLine } from \"./OrderLine.d.ts\";\n\
         import { OrderStatus } from \"./OrderStatus.d.ts\";\n\n"
    ));
    assert!(order.contains("export interface Order {"));

    let status = std::fs::read_to_string(dir.path().join("OrderStatus.d.ts")).unwrap();
    assert!(status.starts_with("export const enum OrderStatus {"));

    let line = std::fs::read_to_string(dir.path().join("OrderLine.d.ts")).unwrap();
    assert!(!line.contains("import"));
}

#[test]
fn declarative_options_drive_pattern_scanning() {
    let (r, _root) = demo_registry();
    let options: GenerateOptions = serde_json::from_str(
        r#"{
            "include_type_names": ["^Demo\\.Models\\."],
            "exclude_type_names": ["Line$"],
            "scan_sources": ["Demo.Models"]
        }"#,
    )
    .unwrap();
    let config = GenerateConfig::builder().options(&options).build().unwrap();
    let mut generator = Generator::new(&r, config);
    let mut sink = MemorySink::new();
    generator.run(&[], &mut sink).unwrap();

    let contents = sink.stream(SINGLE_FILE_NAME).unwrap();
    assert!(contents.contains("export interface Order {"));
    assert!(contents.contains("export const enum OrderStatus {"));
    // OrderLine is pattern-excluded: no declaration, and the referencing
    // field degrades to the untyped placeholder.
    assert!(!contents.contains("export interface OrderLine"));
    assert!(contents.contains("    lines: any[];\n"));
}

#[test]
fn known_types_carry_across_runs_when_opted_in() {
    let (r, root) = demo_registry();
    let config = || GenerateConfig::builder().build().unwrap();

    let mut first = Generator::new(&r, config());
    let mut sink = MemorySink::new();
    first.run(&[root], &mut sink).unwrap();
    let first_len = sink.stream(SINGLE_FILE_NAME).unwrap().len();
    assert!(first_len > 0);

    // Same root again with the carried-over set: nothing left to declare.
    let mut second = Generator::with_known_types(&r, config(), first.into_known_types());
    let mut sink = MemorySink::new();
    second.run(&[root], &mut sink).unwrap();
    assert_eq!(sink.stream(SINGLE_FILE_NAME).unwrap(), "");
}
