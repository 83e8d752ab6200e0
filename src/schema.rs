diesel::table! {
    notes (id) {
        id -> Varchar,
        payload -> Bytea,
        self_destruct -> Bool,
        created_at -> Timestamp,
        expires_at -> Timestamp,
    }
}
