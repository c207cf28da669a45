//! Curated example questions shown to users

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExampleQuery {
    pub natural_language: &'static str,
    pub sql: &'static str,
    pub description: &'static str,
}

const EXAMPLES: &[ExampleQuery] = &[
    ExampleQuery {
        natural_language: "Show all customers from London",
        sql: "SELECT * FROM customers WHERE city = 'London';",
        description: "Retrieves all customer information for customers located in London",
    },
    ExampleQuery {
        natural_language: "List orders with amount greater than 500",
        sql: "SELECT * FROM orders WHERE amount > 500;",
        description: "Shows all orders where the order amount exceeds $500",
    },
    ExampleQuery {
        natural_language: "Find customers older than 30",
        sql: "SELECT * FROM customers WHERE age > 30;",
        description: "Retrieves customers whose age is greater than 30 years",
    },
    ExampleQuery {
        natural_language: "Show total orders by customer",
        sql: "SELECT c.name, COUNT(o.id) as total_orders FROM customers c LEFT JOIN orders o ON c.id = o.customer_id GROUP BY c.id, c.name;",
        description: "Displays each customer's name along with their total number of orders",
    },
    ExampleQuery {
        natural_language: "Get average order amount",
        sql: "SELECT AVG(amount) as average_order_amount FROM orders;",
        description: "Calculates the average amount across all orders",
    },
];

/// The example questions, each paired with the SQL it translates to
pub fn examples() -> &'static [ExampleQuery] {
    EXAMPLES
}
