//! Script for the `ecommerce` sample database.

/// Name the sample database is created under.
pub const SAMPLE_DATABASE: &str = "ecommerce";

/// Statements that (re)build the sample schema and its seed rows. Each one
/// goes through the normal command path.
pub fn ecommerce_script() -> &'static [&'static str] {
    &[
        "DROP TABLE IF EXISTS order_items;",
        "DROP TABLE IF EXISTS orders;",
        "DROP TABLE IF EXISTS products;",
        "DROP TABLE IF EXISTS categories;",
        "DROP TABLE IF EXISTS users;",
        "CREATE TABLE users (\
            user_id INTEGER PRIMARY KEY AUTOINCREMENT, \
            username TEXT NOT NULL UNIQUE, \
            email TEXT NOT NULL, \
            join_date DATETIME DEFAULT CURRENT_TIMESTAMP);",
        "CREATE TABLE categories (\
            category_id INTEGER PRIMARY KEY AUTOINCREMENT, \
            name TEXT NOT NULL, \
            description TEXT);",
        "CREATE TABLE products (\
            product_id INTEGER PRIMARY KEY AUTOINCREMENT, \
            category_id INTEGER, \
            name TEXT NOT NULL, \
            price DECIMAL(10,2) NOT NULL, \
            stock_quantity INTEGER DEFAULT 0, \
            FOREIGN KEY (category_id) REFERENCES categories(category_id) ON DELETE SET NULL);",
        "CREATE TABLE orders (\
            order_id INTEGER PRIMARY KEY AUTOINCREMENT, \
            user_id INTEGER, \
            order_date DATETIME DEFAULT CURRENT_TIMESTAMP, \
            status TEXT CHECK(status IN ('Pending', 'Shipped', 'Delivered', 'Cancelled')) DEFAULT 'Pending', \
            total_amount DECIMAL(10,2), \
            FOREIGN KEY (user_id) REFERENCES users(user_id) ON DELETE CASCADE);",
        "CREATE TABLE order_items (\
            item_id INTEGER PRIMARY KEY AUTOINCREMENT, \
            order_id INTEGER, \
            product_id INTEGER, \
            quantity INTEGER NOT NULL, \
            unit_price DECIMAL(10,2) NOT NULL, \
            FOREIGN KEY (order_id) REFERENCES orders(order_id) ON DELETE CASCADE, \
            FOREIGN KEY (product_id) REFERENCES products(product_id));",
        "INSERT INTO users (username, email) VALUES ('john_doe', 'john@example.com');",
        "INSERT INTO users (username, email) VALUES ('jane_smith', 'jane@test.org');",
        "INSERT INTO users (username, email) VALUES ('alice_wonder', 'alice@wonderland.net');",
        "INSERT INTO users (username, email) VALUES ('bob_builder', 'bob@construction.com');",
        "INSERT INTO users (username, email) VALUES ('charlie_brown', 'charlie@peanuts.io');",
        "INSERT INTO categories (name, description) VALUES ('Electronics', 'Gadgets and devices');",
        "INSERT INTO categories (name, description) VALUES ('Books', 'Paperback and Hardcover books');",
        "INSERT INTO categories (name, description) VALUES ('Clothing', 'Men and Women fashion');",
        "INSERT INTO categories (name, description) VALUES ('Home', 'Furniture and Decor');",
        "INSERT INTO products (category_id, name, price, stock_quantity) VALUES (1, 'Smartphone X', 699.99, 50);",
        "INSERT INTO products (category_id, name, price, stock_quantity) VALUES (1, 'Laptop Pro', 1299.50, 30);",
        "INSERT INTO products (category_id, name, price, stock_quantity) VALUES (1, 'Wireless Earbuds', 149.00, 100);",
        "INSERT INTO products (category_id, name, price, stock_quantity) VALUES (2, 'The Great Algorithm', 45.00, 20);",
        "INSERT INTO products (category_id, name, price, stock_quantity) VALUES (2, 'Database Design 101', 39.99, 15);",
        "INSERT INTO products (category_id, name, price, stock_quantity) VALUES (3, 'Cotton T-Shirt', 19.99, 200);",
        "INSERT INTO products (category_id, name, price, stock_quantity) VALUES (3, 'Denim Jeans', 59.95, 80);",
        "INSERT INTO products (category_id, name, price, stock_quantity) VALUES (4, 'Coffee Table', 120.00, 10);",
        "INSERT INTO orders (user_id, status, total_amount) VALUES (1, 'Delivered', 1449.49);",
        "INSERT INTO orders (user_id, status, total_amount) VALUES (2, 'Pending', 59.95);",
        "INSERT INTO orders (user_id, status, total_amount) VALUES (3, 'Shipped', 84.99);",
        "INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES (1, 2, 1, 1299.50);",
        "INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES (1, 3, 1, 149.99);",
        "INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES (2, 7, 1, 59.95);",
        "INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES (3, 4, 1, 45.00);",
        "INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES (3, 5, 1, 39.99);",
    ]
}
