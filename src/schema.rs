diesel::table! {
    order_items (id) {
        id -> Uuid,
        order_id -> Uuid,
        product_id -> Text,
        product_name -> Text,
        price -> Numeric,
        quantity -> Int4,
        size -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Uuid,
        customer_name -> Text,
        customer_email -> Text,
        customer_phone -> Text,
        address -> Text,
        city -> Text,
        #[max_length = 2]
        state -> Varchar,
        zip_code -> Text,
        total -> Numeric,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    products (id) {
        id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        price -> Numeric,
        image_url -> Nullable<Text>,
        category -> Nullable<Text>,
        stock -> Int4,
        sizes -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(order_items -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(order_items, orders, products,);
