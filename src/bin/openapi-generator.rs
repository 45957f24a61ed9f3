//! Prints the OpenAPI document of the digital bomb bridge as pretty JSON.

use digital_bomb::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let doc = ApiDoc::openapi();
    println!("{}", doc.to_pretty_json().expect("serialize OpenAPI document"));
}
