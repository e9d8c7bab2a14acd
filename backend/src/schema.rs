diesel::table! {
    sensor_data (id) {
        id -> Integer,
        timestamp -> Text,
        temperature -> Nullable<Double>,
        humidity -> Nullable<Double>,
        soil_moisture -> Nullable<Double>,
        sensor_location -> Nullable<Text>,
    }
}
