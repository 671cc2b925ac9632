// Request body and parameter shapes resolved through imports in other files
use openapi_from_controllers::extractor::EndpointExtractor;
use openapi_from_controllers::model::{HttpMethod, ParameterLocation};
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, path: &str, content: &str) {
    let file_path = dir.path().join(path);
    fs::create_dir_all(file_path.parent().unwrap()).unwrap();
    fs::write(file_path, content).unwrap();
}

#[test]
fn test_cross_file_type_resolution() {
    let dir = TempDir::new().unwrap();

    write(
        &dir,
        "shared/paging.ts",
        r#"
        export interface Paging {
          page?: number;
          size?: number;
        }
        "#,
    );
    write(
        &dir,
        "posts/dto/index.ts",
        r#"
        import { Paging } from '../../shared/paging';

        export interface PostFilter extends Paging {
          author: string;
        }

        export class CreatePostDto {
          @ApiProperty({ description: 'Headline', example: 'Hello' })
          title: string;

          body: string;

          static readonly MAX_TITLE = 120;
        }

        export class UpdatePostDto extends PartialType(CreatePostDto) {
          pinned: boolean;
        }
        "#,
    );
    write(
        &dir,
        "posts/posts.controller.ts",
        r#"
        import { CreatePostDto, UpdatePostDto, PostFilter as Filter } from './dto';

        @Controller('posts')
        export class PostsController {
          @Get()
          list(@Query() filter: Filter) {}

          @Post()
          create(@Body() dto: CreatePostDto) {}

          @Patch(':id')
          update(@Param('id') id: string, @Body() dto: UpdatePostDto) {}
        }
        "#,
    );

    let collection = EndpointExtractor::new()
        .parse_file(&dir.path().join("posts/posts.controller.ts"), None, None)
        .unwrap();
    assert_eq!(collection.endpoints.len(), 3);

    let list = &collection.endpoints[0];
    let params: Vec<_> = list
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.location, p.required))
        .collect();
    assert_eq!(
        params,
        vec![
            ("page", ParameterLocation::Query, false),
            ("size", ParameterLocation::Query, false),
            ("author", ParameterLocation::Query, true),
        ]
    );

    let create = &collection.endpoints[1];
    assert_eq!(create.http_method, HttpMethod::Post);
    let body = create.request_body.as_ref().unwrap();
    let names: Vec<_> = body.schema.properties.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["body", "title"]);
    assert_eq!(body.schema.required, vec!["title".to_string(), "body".to_string()]);
    assert_eq!(body.schema.properties["title"].description, "Headline");

    let update = &collection.endpoints[2];
    assert_eq!(update.path, "/posts/{id}");
    let body = update.request_body.as_ref().unwrap();
    assert_eq!(body.schema.properties.len(), 3);
    assert_eq!(body.schema.required, vec!["pinned".to_string()]);
}

#[test]
fn test_circular_types_terminate() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "loop.controller.ts",
        r#"
        interface A extends B { a: string }
        interface B extends A { b: string }

        @Controller('loop')
        export class LoopController {
          @Post()
          create(@Body() dto: A) {}
        }
        "#,
    );

    let collection = EndpointExtractor::new()
        .parse_file(&dir.path().join("loop.controller.ts"), None, None)
        .unwrap();

    let body = collection.endpoints[0].request_body.as_ref().unwrap();
    assert!(body.schema.properties.contains_key("a"));
    assert!(body.schema.properties.contains_key("b"));
}
