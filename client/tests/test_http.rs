// HttpTransport against a one-shot HTTP/1.1 server on the loopback interface.

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use frames_core::message::encode_table;
    use frames_core::stream::read_tables;
    use frames_core::table::{Column, Table};
    use frames_client::{Client, ClientConfig, ClientError, HttpTransport, ReadRequest, Transport};

    /// What the server saw: request line plus headers, and the de-chunked body.
    struct Captured {
        head: String,
        body: Vec<u8>,
    }

    impl Captured {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.eq_ignore_ascii_case(name).then(|| value.trim())
            })
        }
    }

    fn read_chunked(reader: &mut impl BufRead) -> Vec<u8> {
        let mut body = Vec::new();
        loop {
            let mut size = String::new();
            reader.read_line(&mut size).unwrap();
            let size = usize::from_str_radix(size.trim(), 16).unwrap();
            let mut chunk = vec![0u8; size + 2];
            reader.read_exact(&mut chunk).unwrap();
            if size == 0 {
                return body;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    }

    /// Accept one connection, capture the request, answer with `status` and `reply`.
    fn serve_once(status: &'static str, reply: Vec<u8>) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let mut captured = Captured { head, body: Vec::new() };
            let length = captured.header("content-length").map(|v| v.parse::<usize>().unwrap());
            let chunked = captured.header("transfer-encoding") == Some("chunked");

            if let Some(len) = length {
                captured.body = vec![0u8; len];
                reader.read_exact(&mut captured.body).unwrap();
            } else if chunked {
                captured.body = read_chunked(&mut reader);
            }

            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reply.len()
            )
            .unwrap();
            stream.write_all(&reply).unwrap();
            captured
        });
        (url, handle)
    }

    fn table(start: i64, rows: usize) -> Table {
        Table::new(vec![
            Column::ints("id", (start..start + rows as i64).collect()),
            Column::floats("temp", vec![21.5; rows]),
        ])
        .unwrap()
    }

    #[test]
    fn read_posts_json_query_with_api_key() -> anyhow::Result<()> {
        let mut reply = encode_table(&table(0, 3))?.to_vec();
        reply.extend_from_slice(&encode_table(&table(3, 1))?);
        let (url, server) = serve_once("200 OK", reply);

        let transport = HttpTransport::new(&ClientConfig::new(url).with_api_key("secret"))?;
        let mut body = Vec::new();
        transport
            .read(&ReadRequest::new("csv").table("weather.csv"))?
            .read_to_end(&mut body)?;
        assert_eq!(read_tables(&body)?, vec![table(0, 3), table(3, 1)]);

        let seen = server.join().unwrap();
        assert_eq!(seen.request_line(), "POST /read HTTP/1.1");
        assert_eq!(seen.header("authorization"), Some("secret"));
        assert_eq!(seen.header("content-type"), Some("application/json"));

        let query: serde_json::Value = serde_json::from_slice(&seen.body)?;
        assert_eq!(query["type"], "csv");
        assert_eq!(query["table"], "weather.csv");
        Ok(())
    }

    #[test]
    fn rejected_read_keeps_status_and_body() {
        let (url, server) = serve_once("400 Bad Request", b"no such table: t".to_vec());
        let transport = HttpTransport::new(&ClientConfig::new(url)).unwrap();

        match transport.read(&ReadRequest::new("kv").table("t")) {
            Err(ClientError::TransportFailure { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "no such table: t");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("400 should not succeed"),
        }

        let seen = server.join().unwrap();
        assert_eq!(seen.header("authorization"), None);
    }

    #[test]
    fn write_sends_query_params_and_streamed_messages() -> anyhow::Result<()> {
        let (url, server) = serve_once("200 OK", Vec::new());
        let client = Client::new(&ClientConfig::new(url).with_api_key("k"))?;

        let ack = client.write("csv", "out.csv", vec![table(0, 5)], Some(2))?;
        assert_eq!(ack, serde_json::Value::Null);

        let seen = server.join().unwrap();
        assert_eq!(seen.request_line(), "POST /write?type=csv&table=out.csv HTTP/1.1");
        assert_eq!(seen.header("authorization"), Some("k"));

        let rows: Vec<_> = read_tables(&seen.body)?.iter().map(Table::num_rows).collect();
        assert_eq!(rows, vec![2, 2, 1]);
        Ok(())
    }

    #[test]
    fn write_parses_json_ack() -> anyhow::Result<()> {
        let (url, server) = serve_once("200 OK", br#"{"num_frames": 1}"#.to_vec());
        let client = Client::new(&ClientConfig::new(url))?;

        let ack = client.write("kv", "t", vec![table(0, 2)], None)?;
        assert_eq!(ack["num_frames"], 1);
        server.join().unwrap();
        Ok(())
    }

    #[test]
    fn rejected_write_is_a_transport_failure() {
        let (url, server) = serve_once("500 Internal Server Error", b"disk full".to_vec());
        let client = Client::new(&ClientConfig::new(url)).unwrap();

        let err = client.write("kv", "t", vec![table(0, 2)], None).unwrap_err();
        assert_eq!(err.to_string(), "cannot call API (500) - disk full");
        server.join().unwrap();
    }
}
