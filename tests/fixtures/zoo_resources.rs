// Zoo service declared with parameter attributes
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Animal {
    pub id: u64,
    pub name: String,
    pub species: Species,
    pub keeper: Option<Keeper>,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Species {
    Lion,
    Zebra,
    #[serde(rename = "penguin")]
    Penguin,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Keeper {
    pub name: String,
}

pub struct AnimalFilter {
    #[query_param("species")]
    pub species: Option<Species>,
    #[query_param("limit")]
    #[default_value("20")]
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

#[api("/animals", description = "Everything about the animals")]
#[path("/animals")]
#[produces("application/json")]
pub struct AnimalResource;

impl AnimalResource {
    #[get]
    #[api_operation("List animals", notes = "Filtered by species")]
    pub fn list(&self, #[bean_param] filter: AnimalFilter) -> Vec<Animal> {
        unimplemented!()
    }

    #[post]
    #[consumes("application/json")]
    #[api_operation("Add an animal", nickname = "addAnimal")]
    #[api_responses(
        response(code = 201, message = "Created"),
        response(code = 400, message = "Invalid animal")
    )]
    pub fn add(&self, #[api_param("Animal to add", required)] animal: Animal) {}

    #[path("/{animalId:[0-9]+}")]
    #[api_operation("Single animal")]
    pub fn animal(&self, #[path_param("animalId")] id: u64) -> SingleAnimalResource {
        SingleAnimalResource
    }
}

#[api(value = "/animal", tags("animal"))]
pub struct SingleAnimalResource;

impl SingleAnimalResource {
    #[get]
    #[path("/")]
    #[api_operation(
        "Find an animal",
        response_headers(header(name = "X-Rate-Limit", response = "u32", description = "Calls left"))
    )]
    pub fn find(&self) -> Result<Json<Animal>, ApiError> {
        unimplemented!()
    }

    #[delete]
    #[path("/")]
    #[deprecated]
    #[api_operation(
        "Remove an animal",
        authorizations(authorization(value = "zoo_auth", scopes("write:animals")))
    )]
    #[api_implicit_params(param(name = "X-Keeper", param_type = "header", required))]
    pub fn remove(&self) {}

    #[get]
    #[path("/keepers")]
    #[api_operation("Keepers of an animal", response = "Keeper", response_container = "List")]
    pub fn keepers(&self) -> HttpResponse {
        unimplemented!()
    }
}
