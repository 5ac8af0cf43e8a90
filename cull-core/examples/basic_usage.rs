use cull_core::bulk_delete;
use serde::Serialize;

#[derive(Serialize)]
struct OrderLine {
    order_id: i64,
    line_no: i32,
    code: String,
}

fn main() {
    let lines = vec![
        OrderLine {
            order_id: 10,
            line_no: 1,
            code: "A-1".to_string(),
        },
        OrderLine {
            order_id: 11,
            line_no: 2,
            code: "B-2".to_string(),
        },
    ];

    // Single id column
    let statements = bulk_delete("order_lines")
        .with_data(lines)
        .with_id("order_id")
        .to_statements()
        .unwrap();

    println!("CREATE SQL: {}", statements.create_table);
    println!("COPY SQL:   {}", statements.copy);
    println!("DELETE SQL: {}", statements.delete);
    println!("DROP SQL:   {}", statements.drop_table);

    // Composite key, mapped target columns, and a collation override
    let archived = vec![
        OrderLine {
            order_id: 12,
            line_no: 1,
            code: "C-3".to_string(),
        },
    ];

    let statements = bulk_delete("sales.archived_lines")
        .with_data(archived)
        .with_id(("order_id", "code"))
        .map_column("order_id", "OrderId")
        .configure_options(|o| o.collation = Some("C".to_string()))
        .to_statements()
        .unwrap();

    println!("Mapped DELETE SQL: {}", statements.delete);
}
