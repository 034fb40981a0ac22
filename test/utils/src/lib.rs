use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;

pub fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    return Utc
        .with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .unwrap();
}

/// Chat history as it is written by the browser build: camelCase keys and
/// millisecond precision timestamps.
pub fn chat_history_fixture() -> &'static str {
    return r#"
[
  {
    "id": "1700000005000",
    "title": "Write me a haiku about the sea",
    "messages": [
      {
        "id": "1700000001000",
        "content": "Write me a haiku about the sea",
        "sender": "user",
        "timestamp": "2023-11-14T22:13:21.000Z"
      },
      {
        "id": "1700000001001",
        "content": "Great question! Based on what you've mentioned: aes eht tuoba ukiah a em etirW. This is a simulated response for demonstration purposes.",
        "sender": "assistant",
        "timestamp": "2023-11-14T22:13:23.512Z"
      }
    ],
    "createdAt": "2023-11-14T22:13:25.000Z",
    "updatedAt": "2023-11-14T22:13:25.000Z"
  },
  {
    "id": "1690000000000",
    "title": "Hello",
    "messages": [],
    "createdAt": "2023-07-22T04:26:40.000Z",
    "updatedAt": "2023-07-22T04:26:40.000Z"
  }
]
"#
    .trim();
}
