//! Pattern rules and the built-in rule library

use std::fmt;

use crate::matcher::{Matcher, RegexMatcher};

/// Pure function from captured parameters to a SQL string
pub type Template = Box<dyn Fn(&[String]) -> String + Send + Sync>;

/// An ordered (matcher, template) pair
pub struct PatternRule {
    name: String,
    matcher: Box<dyn Matcher>,
    template: Template,
}

impl PatternRule {
    pub fn new<M, F>(name: impl Into<String>, matcher: M, template: F) -> Self
    where
        M: Matcher + 'static,
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            matcher: Box::new(matcher),
            template: Box::new(template),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render SQL if the matcher recognizes `text`
    pub fn apply(&self, text: &str) -> Option<String> {
        self.matcher
            .recognize(text)
            .map(|captures| (self.template)(&captures))
    }
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRule")
            .field("name", &self.name)
            .field("matcher", &self.matcher)
            .finish()
    }
}

/// Rules in priority order. More specific phrasings must come first.
#[derive(Debug, Default)]
pub struct PatternLibrary {
    rules: Vec<PatternRule>,
}

impl PatternLibrary {
    /// Empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding the built-in customer/order phrasings
    pub fn builtin() -> Self {
        let mut library = Self::new();
        library.register_builtins();
        library
    }

    /// Append a rule at the lowest priority
    pub fn register(&mut self, rule: PatternRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn add(&mut self, name: &str, pattern: &str, template: impl Fn(&[String]) -> String + Send + Sync + 'static) {
        let matcher = RegexMatcher::new(pattern).expect("built-in pattern should compile");
        self.register(PatternRule::new(name, matcher, template));
    }

    fn register_builtins(&mut self) {
        const VERB: &str = r"(?:show|list|get|find) (?:all )?";
        const OLDER: &str = r"(?:older than|above|greater than|over)";
        const YOUNGER: &str = r"(?:younger than|below|less than|under)";
        const AMOUNT_PREFIX: &str = r"(?:with amount |worth )?";
        const MORE: &str = r"(?:greater than|above|over)";
        const LESS: &str = r"(?:less than|below|under)";

        // City filters
        self.add(
            "customers_by_city_verb",
            &format!(r"{VERB}customers? (?:from|in|living in) (\w+)"),
            |c| format!("SELECT * FROM customers WHERE city = '{}';", cap(c, 0)),
        );
        self.add(
            "customers_by_city",
            r"customers? (?:from|in|living in) (\w+)",
            |c| format!("SELECT * FROM customers WHERE city = '{}';", cap(c, 0)),
        );

        // Age filters
        self.add(
            "customers_older_verb",
            &format!(r"{VERB}customers? {OLDER} (\d+)"),
            |c| format!("SELECT * FROM customers WHERE age > {};", cap(c, 0)),
        );
        self.add(
            "customers_younger_verb",
            &format!(r"{VERB}customers? {YOUNGER} (\d+)"),
            |c| format!("SELECT * FROM customers WHERE age < {};", cap(c, 0)),
        );
        self.add(
            "customers_older",
            &format!(r"customers? {OLDER} (\d+)"),
            |c| format!("SELECT * FROM customers WHERE age > {};", cap(c, 0)),
        );
        self.add(
            "customers_younger",
            &format!(r"customers? {YOUNGER} (\d+)"),
            |c| format!("SELECT * FROM customers WHERE age < {};", cap(c, 0)),
        );

        // Amount filters
        self.add(
            "orders_above_verb",
            &format!(r"{VERB}orders? {AMOUNT_PREFIX}{MORE} (\d+)"),
            |c| format!("SELECT * FROM orders WHERE amount > {};", cap(c, 0)),
        );
        self.add(
            "orders_below_verb",
            &format!(r"{VERB}orders? {AMOUNT_PREFIX}{LESS} (\d+)"),
            |c| format!("SELECT * FROM orders WHERE amount < {};", cap(c, 0)),
        );
        self.add(
            "orders_above",
            &format!(r"orders? {AMOUNT_PREFIX}{MORE} (\d+)"),
            |c| format!("SELECT * FROM orders WHERE amount > {};", cap(c, 0)),
        );
        self.add(
            "orders_below",
            &format!(r"orders? {AMOUNT_PREFIX}{LESS} (\d+)"),
            |c| format!("SELECT * FROM orders WHERE amount < {};", cap(c, 0)),
        );

        // Aggregates
        self.add(
            "average_order_amount",
            r"(?:get |calculate |find |show )?(?:the )?average (?:order )?amount",
            |_| "SELECT AVG(amount) as average_order_amount FROM orders;".to_string(),
        );
        self.add(
            "total_order_amount",
            r"(?:get |calculate |find |show )?(?:the )?total (?:order )?amount",
            |_| "SELECT SUM(amount) as total_order_amount FROM orders;".to_string(),
        );
        self.add(
            "count_orders",
            r"(?:count |number of |how many )orders",
            |_| "SELECT COUNT(*) as total_orders FROM orders;".to_string(),
        );
        self.add(
            "count_customers",
            r"(?:count |number of |how many )customers",
            |_| "SELECT COUNT(*) as total_customers FROM customers;".to_string(),
        );

        // Joins
        self.add(
            "orders_per_customer",
            r"(?:show |get |list )?(?:total )?orders? (?:by|per|for each) customer",
            |_| {
                "SELECT c.name, COUNT(o.id) as total_orders FROM customers c \
                 LEFT JOIN orders o ON c.id = o.customer_id GROUP BY c.id, c.name;"
                    .to_string()
            },
        );
        self.add(
            "customers_with_orders",
            r"customers? (?:with|and) (?:their )?orders",
            |_| {
                "SELECT c.name, c.city, o.product, o.amount, o.date FROM customers c \
                 LEFT JOIN orders o ON c.id = o.customer_id;"
                    .to_string()
            },
        );

        // Sorted listings
        self.add(
            "sorted_listing",
            r"(?:show|list|get) (?:all )?(customers|orders) (?:sorted|ordered) by ([a-z_][a-z0-9_]*)(?: (ascending|asc|descending|desc))?",
            |c| {
                let direction = match cap(c, 2).to_ascii_lowercase().as_str() {
                    "desc" | "descending" => " DESC",
                    "asc" | "ascending" => " ASC",
                    _ => "",
                };
                format!(
                    "SELECT * FROM {} ORDER BY {}{};",
                    cap(c, 0).to_ascii_lowercase(),
                    cap(c, 1).to_ascii_lowercase(),
                    direction
                )
            },
        );

        // Products
        self.add(
            "orders_for_product",
            r"(?:show |get |list )?orders? for (\w+)",
            |c| format!("SELECT * FROM orders WHERE product LIKE '%{}%';", cap(c, 0)),
        );
        self.add(
            "customers_who_bought",
            r"(?:who|which customers?) (?:bought|ordered) (\w+)",
            |c| {
                format!(
                    "SELECT c.name, o.product, o.amount FROM customers c \
                     JOIN orders o ON c.id = o.customer_id WHERE o.product LIKE '%{}%';",
                    cap(c, 0)
                )
            },
        );

        // Catch-alls, least specific last
        self.add("all_customers", r"(?:show|list|get) all customers", |_| {
            "SELECT * FROM customers;".to_string()
        });
        self.add("all_orders", r"(?:show|list|get) all orders", |_| {
            "SELECT * FROM orders;".to_string()
        });
        self.add("list_customers", r"(?:show|list|get) customers", |_| {
            "SELECT * FROM customers;".to_string()
        });
        self.add("list_orders", r"(?:show|list|get) orders", |_| {
            "SELECT * FROM orders;".to_string()
        });
    }
}

fn cap(captures: &[String], index: usize) -> &str {
    captures.get(index).map(String::as_str).unwrap_or("")
}
