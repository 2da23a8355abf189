#[cfg(test)]
use crate::post::RawPost;

#[cfg(test)]
pub const HELLO_BODY: &str = "Hello from the old blog.

![alt](https://mseeeen.msen.jp/wp-content/uploads/2020/img-640x480.png)

The end.";

#[cfg(test)]
pub fn hello_post() -> RawPost {
    RawPost {
        author_name: "kenzauros".to_string(),
        date: "2020-05-01 10:00:00".to_string(),
        title: Some("Hello".to_string()),
        slug: Some("hello".to_string()),
        content: Some(HELLO_BODY.to_string()),
        status: "publish".to_string(),
        image_url: None,
        tagnames: Some("Rust,Markdown".to_string()),
    }
}

#[cfg(test)]
pub const POSTS_YAML: &str = r#"- author_name: kenzauros
  date: 2020-05-01 10:00:00
  title: Hello
  slug: hello
  post_content_filtered: |-
    Hello from the old blog.

    ![alt](https://mseeeen.msen.jp/wp-content/uploads/2020/img-640x480.png)

    Related: [older post](http://mseeeen.msen.jp/older-post/)
  post_status: publish
  imageUrl:
  tagnames: Rust, Markdown
- author_name: じんない
  date: 2021-02-03 04:05:06
  title: 'Work: in progress'
  slug:
  post_content_filtered: Not finished yet.
  post_status: draft
  imageUrl: https://mseeeen.msen.jp/wp-content/uploads/2021/eye.jpg
  tagnames: Markdown,Windows
- author_name: kenzauros
  date: someday
  title: Broken date
  slug: broken
  post_content_filtered: ''
  post_status: publish
  imageUrl:
  tagnames: ''
"#;

/// Serves a fixed set of urls and records every request
#[cfg(test)]
#[derive(Default)]
pub struct FakeClient {
    images: std::collections::HashMap<String, Vec<u8>>,
    requests: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl FakeClient {
    pub fn with_images(images: &[(&str, &str)]) -> FakeClient {
        FakeClient {
            images: images.iter()
                .map(|(url, content)| (url.to_string(), content.as_bytes().to_vec()))
                .collect(),
            requests: Default::default(),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

#[cfg(test)]
impl crate::image_fetcher::HttpClient for FakeClient {
    fn get(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        match self.images.get(url) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(anyhow::anyhow!("HTTP status client error (404 Not Found) for url ({})", url)),
        }
    }
}
