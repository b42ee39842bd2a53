

// Unit tests for the proc-macro-generated service functions
#[cfg(test)]
mod tests {
	use serde_json::json;
	use tokio_test::block_on;
	use crate::services::{error::ServiceError, traits::ServiceFunction};

	#[crate::command(
		service = "weather",
		name = "getWeather",
		description = "Get weather for a given city",
		params(city = "City name, e.g. 'San Francisco'")
	)]
	fn get_weather(city: String) -> String {
		format!("It's always sunny in {}!", city)
	}

	#[crate::command(
		service = "fsService",
		name = "readFile",
		description = "Read content from a file.",
		params(filename = "The name of the file to read.", encoding = "Optional encoding")
	)]
	async fn read_file(filename: String, encoding: Option<String>) -> Result<String, std::io::Error> {
		if filename == "missing.txt" {
			return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"));
		}
		Ok(format!("{} ({})", filename, encoding.unwrap_or_else(|| "utf8".into())))
	}

	#[crate::command(service = "swapi", name = "getPlanets", description = "Get the list of planets.")]
	fn get_planets() -> Vec<String> {
		vec!["Tatooine".into(), "Alderaan".into()]
	}

	#[test]
	fn generated_command_runs() {
		let command = GetWeatherCommand;
		let got = block_on(command.run(json!({ "city": "sf" }))).expect("command run failed");
		assert_eq!(got, json!("It's always sunny in sf!"));
	}

	#[test]
	fn generated_descriptor_uses_service_and_name() {
		let descriptor = ReadFileCommand.descriptor();
		assert_eq!(descriptor.name, "fsService-readFile");
		assert_eq!(descriptor.description, "Read content from a file.");
		assert_eq!(descriptor.parameters["properties"]["filename"]["type"], "string");
		assert_eq!(descriptor.parameters["properties"]["encoding"]["type"], "string");
		assert_eq!(descriptor.parameters["required"], json!(["filename"]));
	}

	#[test]
	fn async_result_commands_map_errors() {
		let ok = block_on(ReadFileCommand.run(json!({ "filename": "a.txt" }))).unwrap();
		assert_eq!(ok, json!("a.txt (utf8)"));

		let err = block_on(ReadFileCommand.run(json!({ "filename": "missing.txt" }))).unwrap_err();
		assert!(matches!(
			err,
			ServiceError::ExecutionError { ref name, .. } if name == "fsService-readFile"
		));
	}

	#[test]
	fn mismatched_params_are_reported() {
		let err = block_on(GetWeatherCommand.run(json!({ "town": "sf" }))).unwrap_err();
		assert!(matches!(err, ServiceError::ParamsNotMatched(_)));
	}

	#[test]
	fn commands_without_params_accept_empty_object() {
		let got = block_on(GetPlanetsCommand.run(json!({}))).unwrap();
		assert_eq!(got, json!(["Tatooine", "Alderaan"]));
		assert_eq!(GetPlanetsCommand.descriptor().parameters, json!({"type": "object", "properties": {}}));
	}
}
