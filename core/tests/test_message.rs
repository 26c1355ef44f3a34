// Frame message codec: slice/label payloads, field dispatch, skips and failures.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rmpv::Value as DynValue;

    use frames_core::message::{build_message, decode_label_column, decode_message, decode_message_bytes, encode_table, MessageError, WireScalar};
    use frames_core::table::{Column, ColumnData, Table, TableError};
    use frames_core::time::{encode_time_ext, TimeError, Timestamp};
    use frames_core::types::FramesError;

    fn map(entries: Vec<(&str, DynValue)>) -> DynValue {
        DynValue::Map(entries.into_iter().map(|(k, v)| (DynValue::from(k), v)).collect())
    }

    fn names(names: &[&str]) -> DynValue {
        DynValue::Array(names.iter().map(|n| DynValue::from(*n)).collect())
    }

    fn slice_message(name: &str, field: &str, values: Vec<DynValue>) -> DynValue {
        map(vec![
            ("columns", names(&[name])),
            ("slice_cols", map(vec![(name, map(vec![
                ("name", DynValue::from(name)),
                (field, DynValue::Array(values)),
            ]))])),
            ("label_cols", map(vec![])),
        ])
    }

    fn label_message(name: &str, payload: DynValue) -> DynValue {
        map(vec![
            ("columns", names(&[name])),
            ("label_cols", map(vec![(name, payload)])),
        ])
    }

    fn decode(value: &DynValue) -> Table {
        decode_message(value).unwrap().expect("message should carry a table")
    }

    fn sample_table() -> Table {
        Table::new(vec![
            Column::ints("b", vec![3, -1, i64::MAX]),
            Column::strings("a", ["x", "", "zz"]),
            Column::times("t", vec![
                Timestamp::new(1_576_800_000, 123_456_789).unwrap(),
                Timestamp::from_unix_nanos(-1),
                Timestamp::UNIX_EPOCH,
            ]),
            Column::floats("f", vec![0.25, -1e300, 7.0]),
            Column::strings("host", ["h1", "h1", "h1"]),
        ])
        .unwrap()
    }

    #[test]
    fn roundtrip_preserves_names_order_and_values() {
        let table = sample_table();
        let buf = encode_table(&table).unwrap();
        let decoded = decode_message_bytes(&buf).unwrap().unwrap();

        assert_eq!(decoded, table);
        assert_eq!(decoded.column_names().collect::<Vec<_>>(), vec!["b", "a", "t", "f", "host"]);
    }

    #[test]
    fn uniform_columns_become_labels() {
        let table = sample_table();
        let msg = build_message(&table).unwrap();

        assert_eq!(msg.columns, vec!["b", "a", "t", "f", "host"]);
        assert_eq!(msg.label_cols.keys().copied().collect::<Vec<_>>(), vec!["host"]);
        assert_eq!(msg.slice_cols.keys().copied().collect::<Vec<_>>(), vec!["a", "b", "f", "t"]);

        let host = &msg.label_cols["host"];
        assert_eq!(host.value, WireScalar::String("h1"));
        assert_eq!(host.size, 3);
        assert_eq!(host.dtype, "[]string");
    }

    #[test]
    fn single_row_table_is_all_labels() {
        let table = Table::new(vec![
            Column::ints("i", vec![7]),
            Column::times("t", vec![Timestamp::from_secs(9)]),
        ])
        .unwrap();
        let msg = build_message(&table).unwrap();
        assert!(msg.slice_cols.is_empty());
        assert_eq!(msg.label_cols.len(), 2);
        assert_eq!(msg.label_cols["t"].value, WireScalar::NsTime(9_000_000_000));

        let decoded = decode_message_bytes(&encode_table(&table).unwrap()).unwrap().unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn large_label_expands_on_decode() {
        let n = 100_000;
        let table = Table::new(vec![Column::floats("v", vec![1.5; n])]).unwrap();
        let buf = encode_table(&table).unwrap();
        assert!(buf.len() < 128, "label message should not grow with rows: {} bytes", buf.len());

        let decoded = decode_message_bytes(&buf).unwrap().unwrap();
        assert_eq!(decoded.num_rows(), n);
        assert_eq!(decoded, table);
    }

    #[test]
    fn times_are_written_as_raw_nanoseconds() {
        let table = Table::new(vec![Column::times("t", vec![
            Timestamp::from_unix_nanos(5),
            Timestamp::from_unix_nanos(6),
        ])])
        .unwrap();
        let buf = encode_table(&table).unwrap();
        let value = rmpv::decode::read_value(&mut &buf[..]).unwrap();

        let DynValue::Map(top) = value else { panic!("not a map") };
        let slice_cols = top.iter().find(|(k, _)| k.as_str() == Some("slice_cols")).unwrap();
        let DynValue::Map(cols) = &slice_cols.1 else { panic!("slice_cols not a map") };
        let DynValue::Map(col) = &cols[0].1 else { panic!("column not a map") };

        let keys: Vec<_> = col.iter().filter_map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "dtype", "ns_times"]);
        assert_eq!(col[2].1, DynValue::Array(vec![DynValue::from(5i64), DynValue::from(6i64)]));
    }

    #[test]
    fn encoding_is_deterministic() {
        let table = sample_table();
        assert_eq!(encode_table(&table).unwrap(), encode_table(&table.clone()).unwrap());
    }

    #[test]
    fn empty_column_list_is_skipped() {
        assert_eq!(decode_message_bytes(&encode_table(&Table::empty()).unwrap()).unwrap(), None);
        assert_eq!(decode_message(&map(vec![("columns", names(&[]))])).unwrap(), None);
    }

    #[test]
    fn declared_column_without_payload_is_missing() {
        let msg = map(vec![
            ("columns", names(&["x"])),
            ("slice_cols", map(vec![])),
            ("label_cols", map(vec![])),
        ]);
        let err = decode_message(&msg).unwrap_err();
        assert_eq!(err.missing_column(), Some("x"));
        assert_eq!(err.to_string(), "message error: no data for column \"x\"");
    }

    #[test]
    fn slice_without_data_field_is_missing() {
        let msg = slice_message("x", "bools", vec![DynValue::Boolean(true)]);
        let err = decode_message(&msg).unwrap_err();
        assert_eq!(err.missing_column(), Some("x"));
    }

    #[test]
    fn slice_times_decode_extension_blobs() {
        let a = Timestamp::from_secs(1_576_800_000);
        let b = Timestamp::new(1_576_800_000, 42).unwrap();
        let msg = slice_message("t", "times", vec![
            DynValue::Ext(-1, encode_time_ext(&a)),
            DynValue::Ext(-1, encode_time_ext(&b)),
        ]);

        let table = decode(&msg);
        assert_eq!(table.column("t").unwrap().data(), &ColumnData::Times(vec![a, b]));
    }

    #[test]
    fn slice_times_with_bad_length_fail() {
        let msg = slice_message("t", "times", vec![DynValue::Ext(-1, vec![0; 7])]);
        match decode_message(&msg).unwrap_err() {
            FramesError::Time(TimeError::UnknownTimeEncoding { len }) => assert_eq!(len, 7),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn slice_field_priority_prefers_ints() {
        let msg = map(vec![
            ("columns", names(&["v"])),
            ("slice_cols", map(vec![("v", map(vec![
                ("floats", DynValue::Array(vec![DynValue::F64(1.0)])),
                ("ints", DynValue::Array(vec![DynValue::from(1i64)])),
            ]))])),
        ]);
        assert_eq!(decode(&msg).column("v").unwrap().data(), &ColumnData::Ints(vec![1]));

        let msg = map(vec![
            ("columns", names(&["v"])),
            ("slice_cols", map(vec![("v", map(vec![
                ("ints", DynValue::Nil),
                ("strings", DynValue::Array(vec![DynValue::from("s")])),
            ]))])),
        ]);
        assert_eq!(decode(&msg).column("v").unwrap().data(), &ColumnData::Strings(vec!["s".into()]));
    }

    #[test]
    fn slice_with_mismatched_element_fails() {
        let msg = slice_message("v", "ints", vec![DynValue::from(1i64), DynValue::F64(2.0)]);
        assert!(matches!(
            decode_message(&msg).unwrap_err(),
            FramesError::Table(TableError::TypeMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn integer_label_with_time_dtype_is_nanoseconds() {
        let msg = label_message("t", map(vec![
            ("name", DynValue::from("t")),
            ("dtype", DynValue::from("[]time.Time")),
            ("value", DynValue::from(1_500_000_000i64)),
            ("size", DynValue::from(2i64)),
        ]));
        let ts = Timestamp::new(1, 500_000_000).unwrap();
        assert_eq!(decode(&msg).column("t").unwrap().data(), &ColumnData::Times(vec![ts; 2]));

        let msg = label_message("n", map(vec![
            ("dtype", DynValue::from("[]int")),
            ("value", DynValue::from(1_500_000_000i64)),
            ("size", DynValue::from(2i64)),
        ]));
        assert_eq!(decode(&msg).column("n").unwrap().data(), &ColumnData::Ints(vec![1_500_000_000; 2]));
    }

    #[test]
    fn extension_label_decodes_as_time() {
        let msg = label_message("t", map(vec![
            ("value", DynValue::Ext(-1, vec![0, 0, 0, 10])),
            ("size", DynValue::from(3i64)),
        ]));
        assert_eq!(
            decode(&msg).column("t").unwrap().data(),
            &ColumnData::Times(vec![Timestamp::from_secs(10); 3])
        );
    }

    #[test]
    fn label_without_value_is_missing() {
        let msg = label_message("x", map(vec![("size", DynValue::from(3i64))]));
        assert_eq!(decode_message(&msg).unwrap_err().missing_column(), Some("x"));
    }

    #[test]
    fn label_with_unsupported_value_fails() {
        let msg = label_message("x", map(vec![
            ("value", DynValue::Boolean(false)),
            ("size", DynValue::from(1i64)),
        ]));
        assert!(matches!(
            decode_message(&msg).unwrap_err(),
            FramesError::Table(TableError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn structural_problems_are_malformed() {
        let cases = vec![
            DynValue::Array(vec![]),
            map(vec![("slice_cols", map(vec![]))]),
            map(vec![("columns", DynValue::from("a"))]),
            map(vec![("columns", DynValue::Array(vec![DynValue::from(1i64)]))]),
            map(vec![("columns", names(&["a"])), ("slice_cols", DynValue::Array(vec![]))]),
            label_message("x", map(vec![("value", DynValue::from(1i64)), ("size", DynValue::from(-1i64))])),
            label_message("x", DynValue::from(1i64)),
        ];
        for msg in cases {
            let err = decode_message(&msg).unwrap_err();
            assert!(
                matches!(err, FramesError::Message(MessageError::Malformed(_))),
                "expected malformed, got {err}"
            );
        }
    }

    #[test]
    fn unequal_decoded_columns_fail() {
        let msg = map(vec![
            ("columns", names(&["a", "b"])),
            ("slice_cols", map(vec![("a", map(vec![
                ("ints", DynValue::Array(vec![DynValue::from(1i64), DynValue::from(2i64)])),
            ]))])),
            ("label_cols", map(vec![("b", map(vec![
                ("value", DynValue::from("k")),
                ("size", DynValue::from(3i64)),
            ]))])),
        ]);
        assert!(matches!(
            decode_message(&msg).unwrap_err(),
            FramesError::Table(TableError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn unallocatable_label_size_is_an_error() {
        let payload = map(vec![
            ("value", DynValue::from(1i64)),
            ("size", DynValue::from(u64::MAX)),
        ]);
        assert!(matches!(
            decode_message(&label_message("x", payload.clone())).unwrap_err(),
            FramesError::Table(TableError::TooManyRows { .. })
        ));
        assert!(matches!(
            decode_label_column("x", &payload).unwrap_err(),
            FramesError::Table(TableError::TooManyRows { .. })
        ));
    }

    #[test]
    fn label_size_is_checked_against_slice_rows_first() {
        let msg = map(vec![
            ("columns", names(&["b", "a"])),
            ("label_cols", map(vec![("b", map(vec![
                ("value", DynValue::from("k")),
                ("size", DynValue::from(1u64 << 40)),
            ]))])),
            ("slice_cols", map(vec![("a", map(vec![
                ("ints", DynValue::Array(vec![DynValue::from(1i64), DynValue::from(2i64)])),
            ]))])),
        ]);
        match decode_message(&msg).unwrap_err() {
            FramesError::Table(err) => assert_eq!(
                err,
                TableError::LengthMismatch { column: "b".into(), expected: 2, actual: 1 << 40 }
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn label_only_sizes_must_agree() {
        let label = |size: u64| map(vec![("value", DynValue::from(7i64)), ("size", DynValue::from(size))]);
        let msg = map(vec![
            ("columns", names(&["a", "b"])),
            ("label_cols", map(vec![("a", label(2)), ("b", label(1 << 40))])),
        ]);
        match decode_message(&msg).unwrap_err() {
            FramesError::Table(TableError::LengthMismatch { column, expected, actual }) => {
                assert_eq!((column.as_str(), expected, actual), ("b", 2, 1 << 40));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nil_slice_entry_falls_through_to_label() {
        let msg = map(vec![
            ("columns", names(&["x"])),
            ("slice_cols", map(vec![("x", DynValue::Nil)])),
            ("label_cols", map(vec![("x", map(vec![
                ("value", DynValue::from("on")),
                ("size", DynValue::from(2i64)),
            ]))])),
        ]);
        assert_eq!(
            decode(&msg).column("x").unwrap().data(),
            &ColumnData::Strings(vec!["on".into(); 2])
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut buf = encode_table(&sample_table()).unwrap().to_vec();
        buf.push(0x00);
        assert!(matches!(
            decode_message_bytes(&buf).unwrap_err(),
            FramesError::Message(MessageError::Malformed(_))
        ));
    }

    fn column_strategy(name: String, len: usize) -> impl Strategy<Value = Column> {
        let (n1, n2, n3, n4, n5) = (name.clone(), name.clone(), name.clone(), name.clone(), name);
        prop_oneof![
            prop::collection::vec(any::<i64>(), len).prop_map(move |v| Column::ints(n1.clone(), v)),
            prop::collection::vec(-1e12f64..1e12f64, len).prop_map(move |v| Column::floats(n2.clone(), v)),
            prop::collection::vec("[a-z]{0,6}", len).prop_map(move |v| Column::strings(n3.clone(), v)),
            prop::collection::vec(any::<i64>(), len).prop_map(move |v| {
                Column::times(n4.clone(), v.into_iter().map(Timestamp::from_unix_nanos).collect())
            }),
            any::<i64>().prop_map(move |x| Column::ints(n5.clone(), vec![x; len])),
        ]
    }

    fn table_strategy() -> impl Strategy<Value = Table> {
        (1usize..40, 1usize..6).prop_flat_map(|(len, ncols)| {
            (0..ncols)
                .map(|i| column_strategy(format!("c{i}"), len))
                .collect::<Vec<_>>()
                .prop_map(|cols| Table::new(cols).unwrap())
        })
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(table in table_strategy()) {
            let buf = encode_table(&table).unwrap();
            let decoded = decode_message_bytes(&buf).unwrap();
            prop_assert_eq!(decoded, Some(table));
        }
    }
}
