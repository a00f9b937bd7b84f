//! Flickr photo model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::decode::{Decodable, Decoded, Fields};

const NO_DESCRIPTION: &str = "Not provided";

/// A photo from the Flickr REST API, including the `owner_name`,
/// `date_taken` and `description` extras.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    pub id: String,
    pub owner: String,
    pub secret: String,
    pub server: String,
    pub farm: i64,
    pub title: String,
    pub ispublic: bool,
    pub isfriend: bool,
    pub isfamily: bool,

    /// Display name of the owner.
    pub owner_name: String,

    /// When the photo was taken, if Flickr reported a parseable date.
    pub date_taken: Option<DateTime<Utc>>,

    /// Description text, or "Not provided".
    pub description: String,
}

impl Photo {
    /// Square 150px thumbnail.
    pub fn thumbnail_url(&self) -> String {
        self.static_url('q')
    }

    /// 640px image.
    pub fn image_url(&self) -> String {
        self.static_url('z')
    }

    fn static_url(&self, size: char) -> String {
        format!(
            "https://farm{}.staticflickr.com/{}/{}_{}_{}.jpg",
            self.farm, self.server, self.id, self.secret, size
        )
    }
}

impl Decodable for Photo {
    fn decode(json: &Value) -> Decoded<Self> {
        let mut fields = Fields::of::<Self>(json);

        let mut description = fields.nested("description");
        let description_text = description.string_or("_content", NO_DESCRIPTION);
        fields.absorb(description);

        let photo = Photo {
            id: fields.string("id"),
            owner: fields.string("owner"),
            secret: fields.string("secret"),
            server: fields.string("server"),
            farm: fields.int("farm"),
            title: fields.string("title"),
            ispublic: fields.bool("ispublic"),
            isfriend: fields.bool("isfriend"),
            isfamily: fields.bool("isfamily"),
            owner_name: fields.string("ownername"),
            date_taken: fields.date("datetaken"),
            description: description_text,
        };
        fields.finish(photo)
    }

    /// Photos live under `photos.photo` in every Flickr list response.
    fn decode_many(json: &Value) -> Decoded<Vec<Self>> {
        let mut fields = Fields::of::<Self>(json);
        let mut photos = fields.nested("photos");
        let items = photos.array("photo");
        fields.absorb(photos);

        let mut diagnostics = Vec::new();
        let decoded: Vec<Photo> = items
            .iter()
            .map(|item| {
                let photo = Self::decode(item);
                diagnostics.extend(photo.diagnostics);
                photo.value
            })
            .collect();

        let mut result = fields.finish(decoded);
        result.diagnostics.extend(diagnostics);
        result
    }

    fn encode(&self) -> Value {
        json!({
            "id": self.id,
            "owner": self.owner,
            "secret": self.secret,
            "server": self.server,
            "farm": self.farm,
            "title": self.title,
            "ispublic": self.ispublic,
            "isfriend": self.isfriend,
            "isfamily": self.isfamily,
            "ownername": self.owner_name,
            "datetaken": self.date_taken.map(|d| d.to_rfc3339()),
            "description": { "_content": self.description },
        })
    }
}
